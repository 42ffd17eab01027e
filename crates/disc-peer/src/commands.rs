//! Line commands read from stdin.
//!
//! ```text
//! pick              catch the disc out of the air
//! grab              take the disc while nobody holds it
//! throw [x y z]     throw along the view direction, or along (x, y, z)
//! move x y z        move the viewpoint
//! turn degrees      yaw the viewpoint
//! status            log the current state
//! quit
//! ```

use disc_core::Vec3;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    PickUp,
    Grab,
    /// `None` throws along the viewpoint's forward vector.
    Throw(Option<Vec3>),
    MoveTo(Vec3),
    Turn { degrees: f32 },
    Status,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(CommandError::Empty);
    };
    let args: Vec<&str> = words.collect();

    let command = match verb.to_ascii_lowercase().as_str() {
        "pick" | "catch" => Command::PickUp,
        "grab" => Command::Grab,
        "throw" => match args.as_slice() {
            [] => Command::Throw(None),
            [_, _, _] => {
                let direction = vector(&args)
                    .and_then(Vec3::try_normalize)
                    .ok_or(CommandError::Usage("throw [x y z], non-zero direction"))?;
                Command::Throw(Some(direction))
            }
            _ => return Err(CommandError::Usage("throw [x y z]")),
        },
        "move" => Command::MoveTo(vector(&args).ok_or(CommandError::Usage("move x y z"))?),
        "turn" => match args.as_slice() {
            [degrees] => Command::Turn {
                degrees: degrees
                    .parse()
                    .map_err(|_| CommandError::Usage("turn degrees"))?,
            },
            _ => return Err(CommandError::Usage("turn degrees")),
        },
        "status" => Command::Status,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn vector(args: &[&str]) -> Option<Vec3> {
    let [x, y, z] = args else {
        return None;
    };
    let v = Vec3::new(x.parse().ok()?, y.parse().ok()?, z.parse().ok()?);
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_verbs() {
        assert_eq!(parse("pick"), Ok(Command::PickUp));
        assert_eq!(parse("  GRAB "), Ok(Command::Grab));
        assert_eq!(parse("status"), Ok(Command::Status));
        assert_eq!(parse("quit"), Ok(Command::Quit));
    }

    #[test]
    fn test_throw_direction_is_normalized() {
        assert_eq!(parse("throw"), Ok(Command::Throw(None)));
        assert_eq!(
            parse("throw 0 0 4"),
            Ok(Command::Throw(Some(Vec3::FORWARD)))
        );
        assert!(matches!(parse("throw 0 0 0"), Err(CommandError::Usage(_))));
        assert!(matches!(parse("throw 1 2"), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_move_and_turn() {
        assert_eq!(
            parse("move 1 2.5 -3"),
            Ok(Command::MoveTo(Vec3::new(1.0, 2.5, -3.0)))
        );
        assert_eq!(parse("turn 90"), Ok(Command::Turn { degrees: 90.0 }));
        assert!(matches!(parse("move 1 nan 3"), Err(CommandError::Usage(_))));
        assert!(matches!(parse("turn left"), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_bad_input() {
        assert_eq!(parse(""), Err(CommandError::Empty));
        assert_eq!(parse("dance"), Err(CommandError::Unknown("dance".into())));
    }
}
