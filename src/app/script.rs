//! Scripted input for the headless driver.
//!
//! A script is a list of steps separated by `;`. Each step is a `+`-joined
//! list of tokens followed by an optional `@seconds` hold time:
//!
//! ```text
//! KeyW@1.0;KeyW+ShiftLeft@0.5;Space@0.6;look=-200:30+zoom=-300@0.5;@1.0
//! ```
//!
//! Key codes are held for the step's duration. `look=dx:dy` and `zoom=dy`
//! send one pointer or wheel event at the start of the step; `capture` and
//! `release` toggle pointer capture.

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ScriptError {
    #[error("step {step}: `{value}` is not a valid duration")]
    Duration { step: usize, value: String },
    #[error("step {step}: `{token}` is not a valid {kind} token")]
    Token {
        step: usize,
        token: String,
        kind: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Hold(String),
    Look { dx: f32, dy: f32 },
    Zoom(f32),
    Capture(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub actions: Vec<Action>,
    pub seconds: f32,
}

impl Step {
    pub fn held_keys(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().filter_map(|action| match action {
            Action::Hold(code) => Some(code.as_str()),
            _ => None,
        })
    }
}

fn parse_number(step: usize, token: &str, kind: &'static str, text: &str) -> Result<f32, ScriptError> {
    text.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ScriptError::Token {
            step,
            token: token.to_string(),
            kind,
        })
}

fn parse_token(step: usize, token: &str) -> Result<Action, ScriptError> {
    if let Some(args) = token.strip_prefix("look=") {
        let (dx, dy) = args.split_once(':').ok_or_else(|| ScriptError::Token {
            step,
            token: token.to_string(),
            kind: "look",
        })?;
        return Ok(Action::Look {
            dx: parse_number(step, token, "look", dx)?,
            dy: parse_number(step, token, "look", dy)?,
        });
    }
    if let Some(arg) = token.strip_prefix("zoom=") {
        return Ok(Action::Zoom(parse_number(step, token, "zoom", arg)?));
    }
    match token {
        "capture" => Ok(Action::Capture(true)),
        "release" => Ok(Action::Capture(false)),
        code => Ok(Action::Hold(code.to_string())),
    }
}

pub fn parse_script(text: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();

    for (index, raw) in text.split(';').enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let step = index + 1;

        let (tokens, seconds) = match raw.rsplit_once('@') {
            Some((tokens, duration)) => {
                let seconds = duration
                    .trim()
                    .parse::<f32>()
                    .ok()
                    .filter(|s| s.is_finite() && *s >= 0.0)
                    .ok_or_else(|| ScriptError::Duration {
                        step,
                        value: duration.trim().to_string(),
                    })?;
                (tokens, seconds)
            }
            None => (raw, 0.0),
        };

        let actions = tokens
            .split('+')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| parse_token(step, t))
            .collect::<Result<Vec<_>, _>>()?;

        steps.push(Step { actions, seconds });
    }

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_pointer_and_pauses() {
        let steps = parse_script("KeyW+ShiftLeft@1.5; look=-20:4.5+zoom=-100 ;@0.25").unwrap();
        assert_eq!(steps.len(), 3);

        assert_eq!(steps[0].seconds, 1.5);
        assert_eq!(steps[0].held_keys().collect::<Vec<_>>(), ["KeyW", "ShiftLeft"]);

        assert_eq!(steps[1].seconds, 0.0);
        assert_eq!(
            steps[1].actions,
            vec![Action::Look { dx: -20.0, dy: 4.5 }, Action::Zoom(-100.0)]
        );

        assert!(steps[2].actions.is_empty());
        assert_eq!(steps[2].seconds, 0.25);
    }

    #[test]
    fn capture_tokens() {
        let steps = parse_script("capture;release").unwrap();
        assert_eq!(steps[0].actions, vec![Action::Capture(true)]);
        assert_eq!(steps[1].actions, vec![Action::Capture(false)]);
    }

    #[test]
    fn rejects_bad_duration() {
        assert_eq!(
            parse_script("KeyW@soon"),
            Err(ScriptError::Duration {
                step: 1,
                value: "soon".to_string()
            })
        );
        assert!(parse_script("KeyW@-1").is_err());
    }

    #[test]
    fn rejects_malformed_look() {
        let err = parse_script("KeyW@1;look=5@1").unwrap_err();
        assert!(matches!(err, ScriptError::Token { step: 2, kind: "look", .. }));
    }
}
