//! Waggle - 多智能体对话编排器
//!
//! 入口：初始化日志、从配置创建 AgentRuntime，并在 stdin 上运行 REPL。

use std::io::Write;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use waggle::agent::AgentRuntime;
use waggle::cli::{help_text, parse_command, Command};
use waggle::config::load_config;
use waggle::plan::PlanEvent;

fn print_event(event: &PlanEvent) {
    match event {
        PlanEvent::PlanCreated { steps } => {
            println!("  [plan] {} step(s)", steps.len());
            for (i, step) in steps.iter().enumerate() {
                println!("    {}. {}", i + 1, step);
            }
        }
        PlanEvent::StepStarted { iteration, step } => println!("  [step {}] {}", iteration, step),
        PlanEvent::StepCompleted { .. } => {}
        PlanEvent::PlanUpdated { steps } => println!("  [replan] {} step(s) remaining", steps.len()),
        PlanEvent::FinalResponse { .. } => println!("  [done]"),
        PlanEvent::IterationLimit { limit } => {
            println!("  [limit] stopped after {} iterations", limit)
        }
        PlanEvent::Fallback => println!("  [fallback] answering directly"),
    }
}

/// 边等待查询结果边打印编排事件；返回前排空通道，事件总是先于回复输出
async fn run_with_events<T>(
    query: impl std::future::Future<Output = T>,
    events: &mut mpsc::UnboundedReceiver<PlanEvent>,
    mut on_event: impl FnMut(&PlanEvent),
) -> T {
    tokio::pin!(query);
    let result = loop {
        tokio::select! {
            result = &mut query => break result,
            Some(event) = events.recv() => on_event(&event),
        }
    };
    while let Ok(event) = events.try_recv() {
        on_event(&event);
    }
    result
}

fn prompt() -> std::io::Result<()> {
    print!("\nYou: ");
    std::io::stdout().flush()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    waggle::observability::init();

    let cfg = load_config(None).context("Failed to load config")?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<PlanEvent>();
    let runtime = AgentRuntime::from_config(&cfg)
        .context("Failed to create agent runtime")?
        .with_events(event_tx);

    println!("Waggle multi-agent chatbot");
    println!("==========================");
    println!("Type 'exit' to quit, 'help' for available commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match parse_command(&line) {
            Command::Exit => break,
            Command::Help => println!("\n{}", help_text()),
            Command::Usage => println!("\n{}", runtime.usage_summary()),
            Command::Empty => println!("Please enter a query."),
            Command::Query { text, agent } => {
                println!("\nProcessing your query...");
                let outcome = run_with_events(
                    runtime.process_query(&text, agent),
                    &mut event_rx,
                    print_event,
                )
                .await;
                println!("\nResponse:\n{}", outcome.response);
                println!(
                    "\nUsage: {} tokens (${:.4})",
                    outcome.tokens,
                    runtime.cost_of(outcome.tokens)
                );
                println!("Agent used: {}", outcome.agent);
            }
        }
        prompt()?;
    }

    println!("\nExiting...");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use waggle::llm::MockLlmClient;
    use waggle::plan::Orchestrator;

    #[tokio::test]
    async fn test_events_are_delivered_before_the_result() {
        let llm = Arc::new(MockLlmClient::scripted(["- only step", "obs", "   ", "fallback"]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let orchestrator = Orchestrator::from_llm(llm, None).with_events(tx);

        let mut seen = Vec::new();
        let outcome = run_with_events(orchestrator.run("q"), &mut rx, |e| seen.push(e.clone())).await;

        assert_eq!(outcome.response, "fallback");
        assert!(matches!(seen.first(), Some(PlanEvent::PlanCreated { .. })));
        assert_eq!(seen.last(), Some(&PlanEvent::Fallback));
        assert!(rx.try_recv().is_err());
    }
}
