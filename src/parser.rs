use controller::{MovieId, UserId};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, space0},
    combinator::{map, map_res},
    error::ErrorKind,
    sequence::{delimited, pair, preceded, tuple},
    Err, IResult,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Users,
    Movies,
    User(UserId),
    Movie(MovieId),
    AddUser(String),
    AddMovie(String),
    Rate(UserId, MovieId, String),
    Similarity(UserId, UserId),
    Predict(UserId, MovieId),
    Judge(UserId, MovieId),
}

fn parse_id(input: &str) -> IResult<&str, i32> {
    map_res(digit1, |id: &str| id.parse::<i32>())(input)
}

fn parse_separator(input: &str) -> IResult<&str, char> {
    delimited(space0, char(','), space0)(input)
}

// Raw score, coerced later by the store
fn parse_score(input: &str) -> IResult<&str, &str> {
    map(take_while1(|c: char| c != ')' && c != ','), str::trim)(input)
}

fn parse_pair(input: &str) -> IResult<&str, (i32, i32)> {
    map(tuple((parse_id, parse_separator, parse_id)), |(a, _, b)| {
        (a, b)
    })(input)
}

fn args<'a, O, F>(inner: F) -> impl Fn(&'a str) -> IResult<&'a str, O>
where
    F: Fn(&'a str) -> IResult<&'a str, O>,
{
    delimited(pair(char('('), space0), inner, pair(space0, char(')')))
}

// Everything up to the last closing paren, titles may have their own
fn parse_enclosed_text(input: &str) -> IResult<&str, &str> {
    let (input, _) = char::<_, (&str, ErrorKind)>('(')(input)?;

    match input.rfind(')') {
        Some(end) if !input[..end].trim().is_empty() => {
            Ok((&input[end + 1..], input[..end].trim()))
        }
        _ => Err(Err::Error((input, ErrorKind::TakeUntil))),
    }
}

fn parse_statement(input: &str) -> IResult<&str, Statement> {
    alt((
        map(tag("users"), |_| Statement::Users),
        map(tag("movies"), |_| Statement::Movies),
        map(preceded(tag("user"), args(parse_id)), Statement::User),
        map(preceded(tag("movie"), args(parse_id)), Statement::Movie),
        map(preceded(tag("add_user"), parse_enclosed_text), |email| {
            Statement::AddUser(email.into())
        }),
        map(preceded(tag("add_movie"), parse_enclosed_text), |title| {
            Statement::AddMovie(title.into())
        }),
        map(
            preceded(
                tag("rate"),
                args(tuple((
                    parse_id,
                    parse_separator,
                    parse_id,
                    parse_separator,
                    parse_score,
                ))),
            ),
            |(user, _, movie, _, score)| Statement::Rate(user, movie, score.into()),
        ),
        map(preceded(tag("similarity"), args(parse_pair)), |(a, b)| {
            Statement::Similarity(a, b)
        }),
        map(preceded(tag("predict"), args(parse_pair)), |(user, movie)| {
            Statement::Predict(user, movie)
        }),
        map(preceded(tag("judge"), args(parse_pair)), |(user, movie)| {
            Statement::Judge(user, movie)
        }),
    ))(input)
}

pub fn parse_line(input: &str) -> Option<Statement> {
    let input = input.trim();
    let (rest, statement) = parse_statement(input).ok()?;

    if rest.is_empty() {
        Some(statement)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_statements() {
        assert_eq!(parse_line("users"), Some(Statement::Users));
        assert_eq!(parse_line("  movies "), Some(Statement::Movies));
    }

    #[test]
    fn detail_statements() {
        let parsed = parse_statement("user(32)");
        let expected = ("", Statement::User(32));

        assert_eq!(parsed, Ok(expected));

        let parsed = parse_statement("movie( 7 )");
        let expected = ("", Statement::Movie(7));

        assert_eq!(parsed, Ok(expected));
    }

    #[test]
    fn add_statements() {
        assert_eq!(
            parse_line("add_user(the-eye@of-judgment.com)"),
            Some(Statement::AddUser("the-eye@of-judgment.com".into()))
        );

        assert_eq!(
            parse_line("add_movie(Toy Story (1995))"),
            Some(Statement::AddMovie("Toy Story (1995)".into()))
        );

        assert_eq!(parse_line("add_movie()"), None);
        assert_eq!(parse_line("add_user(   )"), None);
    }

    #[test]
    fn rate_statement() {
        let parsed = parse_statement("rate(1, 2, 4.5)");
        let expected = ("", Statement::Rate(1, 2, "4.5".into()));

        assert_eq!(parsed, Ok(expected));

        // Coercion happens in the store, the parser keeps the raw text
        assert_eq!(
            parse_line("rate(1,2, great )"),
            Some(Statement::Rate(1, 2, "great".into()))
        );
    }

    #[test]
    fn pair_statements() {
        assert_eq!(
            parse_line("similarity(1, 2)"),
            Some(Statement::Similarity(1, 2))
        );
        assert_eq!(parse_line("predict(3,4)"), Some(Statement::Predict(3, 4)));
        assert_eq!(parse_line("judge(5 , 6)"), Some(Statement::Judge(5, 6)));
    }

    #[test]
    fn parse_invalid_line() {
        assert!(parse_line("user()").is_none());
        assert!(parse_line("user(abc)").is_none());
        assert!(parse_line("predict(1)").is_none());
        assert!(parse_line("judge(1, 2);").is_none());
        assert!(parse_line("rate(1, 2)").is_none());
        assert!(parse_line("userss").is_none());
    }
}
