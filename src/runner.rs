use anyhow::{Context, Result};
use console::style;
use futures_util::future::BoxFuture;
use std::future::Future;

/// One named, fallible unit of the install pipeline.
pub struct Step<'a> {
    name: &'static str,
    future: BoxFuture<'a, Result<()>>,
}

impl<'a> Step<'a> {
    pub fn new(
        name: &'static str,
        future: impl Future<Output = Result<()>> + Send + 'a,
    ) -> Self {
        Self {
            name,
            future: Box::pin(future),
        }
    }
}

/// Run the steps front-to-back, stopping at the first failure. The error
/// names the step that failed; everything after it is not attempted.
pub async fn run(steps: Vec<Step<'_>>) -> Result<()> {
    let total = steps.len();
    for (i, step) in steps.into_iter().enumerate() {
        eprintln!(
            "{} {}",
            style(format!("[{}/{}]", i + 1, total)).cyan().bold(),
            step.name
        );
        step.future
            .await
            .with_context(|| format!("step '{}' failed", step.name))?;
    }
    Ok(())
}

pub fn banner(message: &str) {
    eprintln!();
    eprintln!("{}", style("------------------------------------").green());
    eprintln!("{}", style(message).green().bold());
    eprintln!("{}", style("------------------------------------").green());
}
