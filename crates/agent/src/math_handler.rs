use anyhow::{bail, Context, Result};
use bosun_core::{extract, has_symbolic_residue, parse_equation, MathPath};
use bosun_math::{format_number, Solutions};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

pub fn derivative_reply(remainder: &str) -> Result<String> {
    let expr = extract(remainder, MathPath::Calculus);
    if expr.is_empty() {
        bail!("no expression to differentiate");
    }

    let derivative = bosun_math::derivative(&expr, 'x')?;
    Ok(format!(
        "The derivative of {expr} with respect to x is {derivative}."
    ))
}

pub fn integral_reply(remainder: &str) -> Result<String> {
    let expr = extract(remainder, MathPath::Calculus);
    if expr.is_empty() {
        bail!("no expression to integrate");
    }

    let integral = bosun_math::integral(&expr, 'x')?;
    Ok(format!("The indefinite integral of {expr} is {integral} plus C."))
}

pub fn solve_reply(remainder: &str) -> Result<String> {
    let equation = parse_equation(remainder);
    if equation.lhs.is_empty() {
        bail!("no equation to solve");
    }

    let solutions =
        bosun_math::solve_equation(&equation.lhs, &equation.rhs, equation.variable)?;

    Ok(match solutions {
        Solutions::All => format!(
            "Any value of {} satisfies that equation.",
            equation.variable
        ),
        Solutions::Roots(roots) if roots.is_empty() => {
            "That equation has no real solutions.".to_string()
        }
        Solutions::Roots(roots) => {
            let rendered: Vec<String> = roots.iter().map(|root| format_number(*root)).collect();
            format!(
                "The solutions for {} are: {}",
                equation.variable,
                rendered.join(", ")
            )
        }
    })
}

/// Arithmetic goes local first. Alphabetic residue (an unbound symbol) or a
/// local miss defers to the remote evaluation service.
pub async fn arithmetic_reply(http: &Client, fallback_url: &str, remainder: &str) -> Result<String> {
    let expr = extract(remainder, MathPath::Arithmetic);
    if expr.is_empty() {
        bail!("no expression to evaluate");
    }

    if !has_symbolic_residue(&expr) {
        match bosun_math::evaluate(&expr) {
            Ok(value) => return Ok(format!("The result is {}.", format_number(value))),
            Err(error) => debug!(%error, expr, "local evaluation failed, trying remote"),
        }
    }

    let value = remote_evaluate(http, fallback_url, &expr).await?;
    Ok(format!("The result is {value}."))
}

#[derive(Debug, Deserialize)]
struct RemoteEvalResponse {
    result: Option<serde_json::Value>,
    error: Option<String>,
}

async fn remote_evaluate(http: &Client, url: &str, expr: &str) -> Result<String> {
    let response = http
        .post(url)
        .json(&json!({ "expr": expr }))
        .send()
        .await
        .context("evaluation service unreachable")?;

    if !response.status().is_success() {
        bail!("evaluation service answered {}", response.status());
    }

    let payload = response
        .json::<RemoteEvalResponse>()
        .await
        .context("evaluation response unreadable")?;

    if let Some(error) = payload.error {
        bail!("evaluation service rejected the expression: {error}");
    }

    match payload.result {
        Some(serde_json::Value::String(text)) => Ok(text),
        Some(value) => Ok(value.to_string()),
        None => bail!("evaluation service returned no result"),
    }
}
