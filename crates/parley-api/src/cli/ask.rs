//! `parley ask` -- one question, printed as styled text or JSON.

use parley_types::ask::AskResult;

use crate::state::AppState;

/// Ask `question` and print the result.
pub async fn ask(
    state: &AppState,
    question: &str,
    instructions: Option<String>,
    json: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let service = match instructions {
        Some(instructions) => (*state.ask).clone().with_instructions(instructions),
        None => (*state.ask).clone(),
    };

    let result = service.ask(question).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result, quiet);
    }

    Ok(())
}

fn print_result(result: &AskResult, quiet: bool) {
    if quiet {
        println!("{}", result.display_text());
        return;
    }

    println!();
    match &result.rewritten {
        Some(rewritten) => {
            println!("  {}", console::style("Answer").bold().green());
            println!();
            println!("  {rewritten}");
            println!();
            println!("  {}", console::style("Original").dim());
            println!("  {}", console::style(&result.original).dim());
        }
        None => {
            println!("  {}", console::style("Answer").bold().green());
            println!();
            println!("  {}", result.original);
            println!();
            println!(
                "  {}",
                console::style("Rewrite unavailable; showing the assistant's original answer.")
                    .yellow()
            );
        }
    }
    println!();
}
