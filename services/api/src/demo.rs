use chrono::Utc;
use clap::Args;
use gigboard::config::MarketplaceConfig;
use gigboard::error::AppError;
use gigboard::workflows::jobs::applications::{
    ApplicantId, Application, ApplicationServiceError, Bid, InMemoryApplicationRepository,
    JobApplicationService,
};
use gigboard::workflows::jobs::{InMemoryJobCatalog, JobId, JobSnapshot};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Application cap for the demo job
    #[arg(long, default_value_t = 2, value_parser = crate::infra::parse_positive)]
    pub(crate) max_applications: u32,
    /// Shortlist cap for the demo job
    #[arg(long, default_value_t = 3, value_parser = crate::infra::parse_positive)]
    pub(crate) shortlist_limit: u32,
    /// Print the final application listing as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            max_applications: 2,
            shortlist_limit: 3,
            json: false,
        }
    }
}

type DemoService = JobApplicationService<InMemoryApplicationRepository, InMemoryJobCatalog>;

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        max_applications,
        shortlist_limit,
        json,
    } = args;

    let config = MarketplaceConfig {
        default_max_applications: max_applications,
        shortlist_limit: shortlist_limit as usize,
        ..MarketplaceConfig::default()
    };
    let job_id = JobId::from("demo-shorts-edit");
    let catalog = Arc::new(InMemoryJobCatalog::default());
    catalog.register(JobSnapshot::open(job_id.clone(), Utc::now(), &config))?;
    let service = JobApplicationService::new(
        Arc::new(InMemoryApplicationRepository::default()),
        catalog,
        &config,
    );

    println!("Application lifecycle demo");
    println!(
        "Job {}: up to {} applications, {} shortlist slots, {}h bidding window",
        job_id, max_applications, shortlist_limit, config.default_deadline_hours
    );

    println!("\nBids");
    let mut admitted = Vec::new();
    for (applicant, price) in [("alice", 220.0), ("bob", 185.0), ("carol", 160.0)] {
        match service.submit_application(&job_id, ApplicantId::from(applicant), demo_bid(price)) {
            Ok(application) => {
                println!(
                    "- {} admitted as #{} ({})",
                    applicant, application.position, application.id
                );
                admitted.push(application);
            }
            Err(err) => println!("- {} refused: {} [{}]", applicant, err, err.code()),
        }
    }

    if let Some(first) = admitted.first() {
        match service.submit_application(&job_id, first.applicant_id.clone(), demo_bid(199.0)) {
            Ok(_) => println!("- {} bid twice and was admitted again", first.applicant_id),
            Err(err) => println!("- {} second bid refused: {}", first.applicant_id, err),
        }
    }

    println!("\nShortlist");
    for application in &admitted {
        report("shortlist", application, service.shortlist_application(&application.id));
    }
    if let Some(first) = admitted.first() {
        report("reject", first, service.reject_application(&first.id));
        report("shortlist", first, service.shortlist_application(&first.id));
    }

    let window = service.application_window(&job_id)?;
    println!(
        "\nWindow: {}/{} applications, {} shortlisted of {}, accepting bids: {}",
        window.current_applications,
        window.max_applications,
        window.shortlisted,
        window.shortlist_limit,
        window.accepting
    );

    print_listing(&service, &job_id, json)
}

fn report(
    action: &str,
    application: &Application,
    outcome: Result<Application, ApplicationServiceError>,
) {
    match outcome {
        Ok(updated) => println!(
            "- {} {}: now {}",
            action,
            application.applicant_id,
            updated.status.label()
        ),
        Err(err) => println!(
            "- {} {}: refused ({})",
            action,
            application.applicant_id,
            err.code()
        ),
    }
}

fn print_listing(service: &DemoService, job_id: &JobId, json: bool) -> Result<(), AppError> {
    let applications = service.applications_for_job(job_id)?;
    if json {
        let views: Vec<_> = applications.iter().map(Application::view).collect();
        match serde_json::to_string_pretty(&views) {
            Ok(payload) => println!("\n{}", payload),
            Err(err) => println!("\nListing unavailable: {}", err),
        }
        return Ok(());
    }

    println!("\nFinal listing");
    for application in &applications {
        println!(
            "- #{} {} {} ({:.2} over {} days)",
            application.position,
            application.applicant_id,
            application.status.label(),
            application.bid.proposed_price,
            application.bid.delivery_days
        );
    }
    Ok(())
}

fn demo_bid(price: f64) -> Bid {
    Bid {
        proposed_price: price,
        delivery_days: 3,
        pitch: "Fast-paced cuts, captions, and sound cleanup for short-form video".to_string(),
        portfolio_sample_url: Some("https://example.com/reel".to_string()),
        question_for_creator: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_against_in_memory_stores() {
        run_demo(DemoArgs::default()).expect("demo completes");
    }

    #[test]
    fn demo_accepts_json_listing() {
        let args = DemoArgs {
            max_applications: 3,
            shortlist_limit: 1,
            json: true,
        };
        run_demo(args).expect("demo completes");
    }

    #[test]
    fn positive_parser_rejects_zero() {
        assert!(crate::infra::parse_positive("0").is_err());
        assert_eq!(crate::infra::parse_positive(" 4 "), Ok(4));
    }
}
