use eyre::{Context, Result};
use std::io::Write;

/// Prompt on stdout and read one trimmed line from stdin.
pub fn read_input(name: &str) -> Result<String> {
    print!("{name}: ");
    std::io::stdout().flush().wrap_err("Failed to flush stdout")?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .wrap_err_with(|| format!("Failed to read {name}"))?;
    Ok(input.trim().to_string())
}

pub fn read_input_hidden(name: &str) -> Result<String> {
    rpassword::prompt_password(format!("{name}: "))
        .wrap_err_with(|| format!("Failed to read {name}"))
}
