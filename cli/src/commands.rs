use mathtiles_core::{Coord, Input, TileId};

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Inputs(Vec<Input>),
    NewGame,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  open X Y   (o)   open the tile in column X, row Y
  hover X Y        highlight a covered tile
  leave X Y        remove the highlight
  DIGITS           type digits into the open tile, end with = to submit
  back       (b)   delete the last digit
  enter      (=)   submit the answer
  show             print the board
  new              start over with the same options
  quit       (q)   exit";

pub fn parse(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Show);
    };
    let args: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "open" | "o" => Command::Inputs(vec![Input::Open(coords(&args)?)]),
        "hover" => Command::Inputs(vec![Input::Hover(coords(&args)?)]),
        "leave" => Command::Inputs(vec![Input::Leave(coords(&args)?)]),
        "back" | "b" => Command::Inputs(vec![Input::Backspace]),
        "enter" | "e" | "=" => Command::Inputs(vec![Input::Submit]),
        "show" => Command::Show,
        "new" => Command::NewGame,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => digits(other)?,
    };
    Ok(command)
}

fn coords(args: &[&str]) -> Result<TileId, String> {
    match *args {
        [x, y] => Ok((coord(x)?, coord(y)?)),
        [xy] => match xy.split_once(',') {
            Some((x, y)) => Ok((coord(x)?, coord(y)?)),
            None => Err(format!("{xy:?} is not a tile position")),
        },
        _ => Err("expected a tile position: X Y".to_string()),
    }
}

fn coord(text: &str) -> Result<Coord, String> {
    text.trim_matches(',')
        .parse()
        .map_err(|_| format!("{text:?} is not a tile coordinate"))
}

fn digits(word: &str) -> Result<Command, String> {
    let (number, submit) = match word.strip_suffix('=') {
        Some(number) => (number, true),
        None => (word, false),
    };
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("unknown command {word:?}, try help"));
    }
    let mut inputs: Vec<Input> = number.chars().map(Input::Digit).collect();
    if submit {
        inputs.push(Input::Submit);
    }
    Ok(Command::Inputs(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_open_in_both_forms() {
        assert_eq!(parse("open 1 2"), Ok(Command::Inputs(vec![Input::Open((1, 2))])));
        assert_eq!(parse("o 3,0"), Ok(Command::Inputs(vec![Input::Open((3, 0))])));
        assert!(parse("open 1").is_err());
        assert!(parse("open a b").is_err());
    }

    #[test]
    fn digits_with_equals_submit() {
        assert_eq!(
            parse("12="),
            Ok(Command::Inputs(vec![
                Input::Digit('1'),
                Input::Digit('2'),
                Input::Submit
            ]))
        );
        assert_eq!(parse("7"), Ok(Command::Inputs(vec![Input::Digit('7')])));
    }

    #[test]
    fn rejects_unknown_words() {
        assert!(parse("12a").is_err());
        assert!(parse("jump").is_err());
        assert!(parse("=").is_ok());
    }

    #[test]
    fn blank_line_shows_board() {
        assert_eq!(parse("   "), Ok(Command::Show));
        assert_eq!(parse("Q"), Ok(Command::Quit));
    }
}
