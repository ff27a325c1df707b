use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::config;
use crate::gate::{GateDecision, RouteGate};

pub fn handle(target: &str, signed_in: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let gate = RouteGate::from_config(&config().routes)?;

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    let class = gate.classify(path);
    let decision = gate.decide(path, query, signed_in);
    let action = match &decision {
        GateDecision::PassThrough => "pass",
        GateDecision::RedirectToDashboard { .. } => "redirect-dashboard",
        GateDecision::RedirectToLogin { .. } => "redirect-login",
    };

    match output_format {
        OutputFormat::Json => {
            let body = json!({
                "path": path,
                "class": format!("{:?}", class),
                "signed_in": signed_in,
                "action": action,
                "location": decision.location(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => match decision.location() {
            Some(location) => println!("{} ({:?}): {} -> {}", path, class, action, location),
            None => println!("{} ({:?}): {}", path, class, action),
        },
    }
    Ok(())
}
