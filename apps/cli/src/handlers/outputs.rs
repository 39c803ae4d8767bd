use anyhow::Result;
use sdeck::domain::Environment;
use sdeck::features::outputs::{OutputKey, expected_keys};

/// Prints the output keys of `environment`, one per line.
///
/// # Errors
/// Returns an error only if JSON encoding fails.
pub fn run(environment: Environment, json: bool) -> Result<()> {
    let keys: Vec<&'static str> = expected_keys(environment).into_iter().map(OutputKey::as_wire).collect();

    if json {
        println!("{}", serde_json::to_string(&keys)?);
    } else {
        for key in keys {
            println!("{key}");
        }
    }
    Ok(())
}
