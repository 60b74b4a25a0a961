use keel_derive::keel_error;
use std::borrow::Cow;

#[keel_error]
pub enum DemoError {
    #[error("Parse error{}: {source}", format_context(.context))]
    Parse {
        #[source]
        source: std::num::ParseIntError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Missing entry{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<i64, DemoError> {
    let value = raw.parse::<i64>().context("Parsing demo value")?;
    Ok(value)
}

fn lookup(found: bool) -> Result<(), DemoError> {
    if found {
        Ok(())
    } else {
        Err(DemoError::Missing { message: "demo".into(), context: None }).context("Looking up")
    }
}

fn main() {
    assert!(parse("12").is_ok());
    assert!(matches!(parse("x"), Err(DemoError::Parse { context: Some(_), .. })));
    assert!(matches!(lookup(false), Err(DemoError::Missing { context: Some(_), .. })));
    let internal: DemoError = "boom".into();
    assert_eq!(internal.to_string(), "Internal error: boom");
}
