use std::io::Write;
use std::path::PathBuf;

use clap::CommandFactory;

use crate::Cli;

pub(crate) fn handle_completions(
    shell: clap_complete::Shell,
) -> Result<(), Box<dyn std::error::Error>> {
    let script = render_completions(shell);
    std::io::stdout().write_all(&script)?;
    Ok(())
}

pub(crate) fn handle_man(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(dir) => {
            // One page per subcommand, plus the top-level page.
            std::fs::create_dir_all(&dir)?;
            clap_mangen::generate_to(Cli::command(), &dir)?;
            println!("Wrote man pages to {}", dir.display());
        }
        None => std::io::stdout().write_all(&render_main_page()?)?,
    }
    Ok(())
}

fn render_completions(shell: clap_complete::Shell) -> Vec<u8> {
    let mut script = Vec::new();
    clap_complete::generate(shell, &mut Cli::command(), "hubsync", &mut script);
    script
}

fn render_main_page() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut page = Vec::new();
    clap_mangen::Man::new(Cli::command()).render(&mut page)?;
    Ok(page)
}
