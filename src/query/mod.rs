/// Inline query text split into the access code and whatever follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedQuery<'a> {
    pub code: &'a str,
    pub payload: &'a str,
}

/// Splits on the first whitespace only, so `"1234 a b"` keeps `"a b"` as payload.
pub fn parse(raw: &str) -> ParsedQuery<'_> {
    let raw = raw.trim_start();
    match raw.split_once(char::is_whitespace) {
        Some((code, rest)) => ParsedQuery {
            code,
            payload: rest.trim(),
        },
        None => ParsedQuery {
            code: raw.trim_end(),
            payload: "",
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Instructions,
    WrongCode,
    PayloadRequired,
    Success,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Instructions => "instructions",
            Outcome::WrongCode => "wrong_code",
            Outcome::PayloadRequired => "payload_required",
            Outcome::Success => "success",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<'a> {
    Instructions,
    WrongCode { entered: &'a str },
    PayloadRequired,
    Success { username: &'a str },
}

impl Verdict<'_> {
    pub fn outcome(&self) -> Outcome {
        match self {
            Verdict::Instructions => Outcome::Instructions,
            Verdict::WrongCode { .. } => Outcome::WrongCode,
            Verdict::PayloadRequired => Outcome::PayloadRequired,
            Verdict::Success { .. } => Outcome::Success,
        }
    }
}

/// The auth gate. An empty query always gets instructions, even when the
/// configured code is itself empty.
pub fn classify<'a>(query: &ParsedQuery<'a>, secret: &str) -> Verdict<'a> {
    if query.code.is_empty() {
        return Verdict::Instructions;
    }
    if query.code != secret {
        return Verdict::WrongCode {
            entered: query.code,
        };
    }
    if query.payload.is_empty() {
        return Verdict::PayloadRequired;
    }
    Verdict::Success {
        username: query.payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_space() {
        let parsed = parse("1234 Sui_panda");
        assert_eq!(parsed.code, "1234");
        assert_eq!(parsed.payload, "Sui_panda");

        let parsed = parse("1234 two words");
        assert_eq!(parsed.payload, "two words");
    }

    #[test]
    fn whitespace_runs_are_collapsed_around_payload() {
        let parsed = parse("  1234   alice  ");
        assert_eq!(parsed, ParsedQuery { code: "1234", payload: "alice" });

        let parsed = parse("1234\tbob");
        assert_eq!(parsed, ParsedQuery { code: "1234", payload: "bob" });
    }

    #[test]
    fn empty_query() {
        assert_eq!(parse(""), ParsedQuery { code: "", payload: "" });
        assert_eq!(parse("   "), ParsedQuery { code: "", payload: "" });
        assert_eq!(classify(&parse(""), "1234"), Verdict::Instructions);
    }

    #[test]
    fn code_without_payload() {
        let parsed = parse("1234");
        assert_eq!(parsed, ParsedQuery { code: "1234", payload: "" });
        assert_eq!(classify(&parsed, "1234"), Verdict::PayloadRequired);
        assert_eq!(classify(&parse("1234 "), "1234"), Verdict::PayloadRequired);
    }

    #[test]
    fn matching_code_with_payload() {
        assert_eq!(
            classify(&parse("1234 x"), "1234"),
            Verdict::Success { username: "x" }
        );
    }

    #[test]
    fn wrong_code_keeps_entered_value() {
        assert_eq!(
            classify(&parse("0000 x"), "1234"),
            Verdict::WrongCode { entered: "0000" }
        );
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let verdict = classify(&parse("Secret bob"), "secret");
        assert_eq!(verdict.outcome(), Outcome::WrongCode);
    }

    #[test]
    fn empty_secret_still_gives_instructions_for_empty_query() {
        assert_eq!(classify(&parse(""), ""), Verdict::Instructions);
        assert_eq!(classify(&parse("x y"), "").outcome(), Outcome::WrongCode);
    }
}
