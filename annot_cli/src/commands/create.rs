use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use annot_core::{
    classify, extract_references, AnnotationRequest, AnnotationSink, Annotator, CompositeReport,
    FanoutSummary, ResolutionStatus, Slo,
};
use annot_client::sloctl;

use crate::{prompt, session, ui};

pub async fn execute(config_flag: Option<PathBuf>, context_flag: Option<String>) -> Result<()> {
    ui::print_header("Nobl9 Annotation Creator");
    println!(
        "Timestamps use RFC3339 (e.g. {}).",
        example_timestamp().yellow()
    );
    println!("Each annotation receives a unique UUID per target SLO.");

    let session = session::authenticate(config_flag, context_flag).await?;
    sloctl::use_context(&session.context.name).await?;

    let inventory = sloctl::fetch_inventory().await?;
    ui::print_success(&format!("Retrieved {} SLOs", inventory.len()));

    let annotator = Annotator::new(session.client);

    loop {
        ui::print_header("Main menu");
        println!("Choose how to apply annotations:");
        println!("  [1] All SLOs in a project");
        println!("  [2] All SLOs in a service");
        println!("  [3] Selected individual SLOs");
        println!("  [4] A composite SLO and its components");
        println!("  [x] Exit");

        let choice = prompt::read_line("Select an option:")?;
        match choice.as_str() {
            "1" => annotate_project(&annotator, &inventory).await?,
            "2" => annotate_service(&annotator, &inventory).await?,
            "3" => annotate_selection(&annotator, &inventory).await?,
            "4" => annotate_composite(&annotator, &inventory).await?,
            "x" | "X" => {
                ui::print_info("Goodbye!");
                return Ok(());
            }
            _ => ui::print_error("Invalid option. Please select 1, 2, 3, 4, or x."),
        }
    }
}

/// Groups in first-seen order, the order the inventory lists them.
fn group_by<'a, F>(inventory: &'a [Slo], key: F) -> Vec<(String, Vec<&'a Slo>)>
where
    F: Fn(&Slo) -> Option<&str>,
{
    let mut groups: Vec<(String, Vec<&Slo>)> = Vec::new();
    for slo in inventory {
        let Some(group_key) = key(slo) else {
            continue;
        };
        if let Some((_, members)) = groups.iter_mut().find(|(name, _)| name == group_key) {
            members.push(slo);
        } else {
            groups.push((group_key.to_string(), vec![slo]));
        }
    }
    groups
}

async fn annotate_project<S: AnnotationSink>(
    annotator: &Annotator<S>,
    inventory: &[Slo],
) -> Result<()> {
    let groups = group_by(inventory, |slo| Some(slo.project.as_str()));
    if groups.is_empty() {
        ui::print_warning("No projects found with SLOs.");
        return Ok(());
    }

    ui::print_header("Projects");
    for (i, (project, members)) in groups.iter().enumerate() {
        println!(
            "  [{}] {} ({} SLOs)",
            i + 1,
            project,
            members.len().to_string().green()
        );
    }

    let index = prompt::select_index("Select a project by number:", groups.len())?;
    let (project, members) = &groups[index];
    ui::print_info(&format!("Selected project: {project}"));

    let targets: Vec<Slo> = members.iter().map(|slo| (*slo).clone()).collect();
    let request = prompt_request()?;
    run_fanout(annotator, &targets, &request).await
}

async fn annotate_service<S: AnnotationSink>(
    annotator: &Annotator<S>,
    inventory: &[Slo],
) -> Result<()> {
    let groups = group_by(inventory, |slo| slo.service.as_deref());
    if groups.is_empty() {
        ui::print_warning("No services found with SLOs.");
        return Ok(());
    }

    ui::print_header("Services");
    for (i, (service, members)) in groups.iter().enumerate() {
        println!(
            "  [{}] {} ({} SLOs)",
            i + 1,
            service,
            members.len().to_string().green()
        );
    }

    let index = prompt::select_index("Select a service by number:", groups.len())?;
    let (service, members) = &groups[index];
    ui::print_info(&format!("Selected service: {service}"));

    let targets: Vec<Slo> = members.iter().map(|slo| (*slo).clone()).collect();
    let request = prompt_request()?;
    run_fanout(annotator, &targets, &request).await
}

async fn annotate_selection<S: AnnotationSink>(
    annotator: &Annotator<S>,
    inventory: &[Slo],
) -> Result<()> {
    if inventory.is_empty() {
        ui::print_warning("The inventory is empty.");
        return Ok(());
    }

    ui::print_header("Individual SLOs");
    for (i, slo) in inventory.iter().enumerate() {
        println!(
            "  [{}] {} (project: {}, service: {})",
            i + 1,
            slo.display_name(),
            slo.project,
            slo.service.as_deref().unwrap_or("-")
        );
    }

    let indices = loop {
        let raw = prompt::read_line("Enter SLO numbers separated by commas (e.g. 1,3,5):")?;
        match prompt::parse_selection(&raw, inventory.len()) {
            Some(indices) => break indices,
            None => ui::print_error("Invalid selection. Enter numbers separated by commas."),
        }
    };

    let targets: Vec<Slo> = indices.iter().map(|&i| inventory[i].clone()).collect();
    ui::print_info(&format!("Selected {} SLOs", targets.len()));

    let request = prompt_request()?;
    run_fanout(annotator, &targets, &request).await
}

async fn annotate_composite<S: AnnotationSink>(
    annotator: &Annotator<S>,
    inventory: &[Slo],
) -> Result<()> {
    let partition = classify(inventory);
    if partition.composites.is_empty() {
        ui::print_warning("No composite SLOs found in the inventory.");
        return Ok(());
    }

    ui::print_header("Composite SLOs");
    for (i, composite) in partition.composites.iter().enumerate() {
        let refs = extract_references(composite);
        println!(
            "  [{}] {} (project: {}, {} components)",
            i + 1,
            composite.display_name(),
            composite.project,
            refs.len().to_string().green()
        );
    }

    let index = prompt::select_index(
        "Select a composite by number:",
        partition.composites.len(),
    )?;
    let composite = &partition.composites[index];
    ui::print_info(&format!("Selected composite: {}", composite.display_name()));

    let request = prompt_request()?;
    let report = annotator
        .annotate_composite(inventory, composite, &request)
        .await;
    report_composite(&report);
    Ok(())
}

/// Description, optional Markdown link, and the time range.
fn prompt_request() -> Result<AnnotationRequest> {
    let mut description = prompt::read_nonempty("Enter annotation description:", "description")?;

    if let Some(link_text) = prompt::read_optional("External hyperlink text (optional, Enter to skip):")? {
        match prompt::read_optional("Enter URL:")? {
            Some(url) => {
                description.push_str(&format!("\n\n[{link_text}]({url})"));
                ui::print_success(&format!("Added link: [{link_text}]({url})"));
            }
            None => {
                ui::print_warning("URL is required when link text is provided; skipping link.")
            }
        }
    }

    let example = example_timestamp();
    let start_time = prompt::read_timestamp(&format!("Enter start time (e.g. {example}):"))?;
    let end_time = prompt::read_timestamp(&format!("Enter end time (e.g. {example}):"))?;

    Ok(AnnotationRequest {
        description,
        start_time,
        end_time,
    })
}

async fn run_fanout<S: AnnotationSink>(
    annotator: &Annotator<S>,
    targets: &[Slo],
    request: &AnnotationRequest,
) -> Result<()> {
    ui::print_info(&format!("Creating annotations for {} SLOs", targets.len()));
    let summary = annotator.apply(targets, request).await;
    report_summary("Annotation creation", &summary);
    Ok(())
}

fn report_summary(label: &str, summary: &FanoutSummary) {
    let line = format!(
        "{label} complete: {}/{} successful",
        summary.succeeded, summary.total
    );
    if summary.total == 0 {
        ui::print_info(&line);
    } else if summary.all_succeeded() {
        ui::print_success(&line);
    } else if summary.succeeded == 0 {
        ui::print_error(&line);
    } else {
        ui::print_warning(&line);
    }
}

fn report_composite(report: &CompositeReport) {
    report_summary("Composite annotation", &report.composite);
    if let Some(components) = &report.components {
        report_summary("Component annotation", components);
    }

    match report.resolution() {
        ResolutionStatus::NoReferences => {
            ui::print_info("Composite declares no components; only the composite was annotated.")
        }
        ResolutionStatus::NothingResolved => ui::print_warning(&format!(
            "None of the {} component references resolved; only the composite was annotated.",
            report.referenced
        )),
        ResolutionStatus::Partial => ui::print_warning(&format!(
            "Resolved {} of {} component references; unresolved components were skipped.",
            report.resolved, report.referenced
        )),
        ResolutionStatus::Complete => ui::print_success(&format!(
            "All {} component references resolved.",
            report.resolved
        )),
    }
}

fn example_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slo(project: &str, name: &str, service: Option<&str>) -> Slo {
        let mut slo = Slo::new(project, name);
        slo.service = service.map(str::to_string);
        slo
    }

    #[test]
    fn groups_by_project_in_first_seen_order() {
        let inventory = vec![
            slo("payments", "latency", None),
            slo("search", "errors", None),
            slo("payments", "errors", None),
        ];

        let groups = group_by(&inventory, |slo| Some(slo.project.as_str()));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "payments");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "search");
    }

    #[test]
    fn slos_without_a_service_fall_out_of_service_groups() {
        let inventory = vec![
            slo("payments", "latency", Some("checkout")),
            slo("payments", "errors", None),
        ];

        let groups = group_by(&inventory, |slo| slo.service.as_deref());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "checkout");
        assert_eq!(groups[0].1.len(), 1);
    }
}
