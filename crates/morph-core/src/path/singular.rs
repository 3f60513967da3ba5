//! Singular path grammar.
//!
//! A singular path names at most one location: `$`, then any mix of
//! `.name`, `['name']`, `["name"]` and non-negative `[n]`. Tag writes and
//! template contexts are addressed this way.

use super::{PathError, PathSegment};
use chumsky::extra;
use chumsky::prelude::*;

type Extra<'src> = extra::Err<Rich<'src, char>>;

/// Parse a root-qualified singular path into its segments
pub(crate) fn parse(path: &str) -> Result<Vec<PathSegment>, PathError> {
    singular_path()
        .parse(path)
        .into_result()
        .map_err(|errs| {
            let (position, message) = errs
                .first()
                .map(|e| (e.span().start, e.reason().to_string()))
                .unwrap_or((0, "invalid path".to_string()));
            PathError::Syntax {
                path: path.to_string(),
                position,
                message,
            }
        })
}

fn singular_path<'src>() -> impl Parser<'src, &'src str, Vec<PathSegment>, Extra<'src>> {
    just('$')
        .ignore_then(
            dot_member()
                .or(bracket())
                .repeated()
                .collect::<Vec<_>>(),
        )
        .then_ignore(end())
}

/// `.name`, where the name runs up to the next `.` or `[`
fn dot_member<'src>() -> impl Parser<'src, &'src str, PathSegment, Extra<'src>> + Clone {
    just('.')
        .ignore_then(
            none_of(".[]*'\"")
                .repeated()
                .at_least(1)
                .to_slice()
                .try_map(|s: &str, span| {
                    let name = s.trim();
                    if name.is_empty() {
                        Err(Rich::custom(span, "expected member name"))
                    } else {
                        Ok(PathSegment::Member(name.to_string()))
                    }
                }),
        )
        .labelled("member")
}

/// `['name']`, `["name"]` or `[n]`
fn bracket<'src>() -> impl Parser<'src, &'src str, PathSegment, Extra<'src>> + Clone {
    let member = quoted('\'').or(quoted('"')).map(PathSegment::Member);
    let index = index().map(PathSegment::Index);

    just('[')
        .ignore_then(member.or(index).padded())
        .then_ignore(just(']'))
        .labelled("bracket selector")
}

fn quoted<'src>(quote: char) -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    let escape = just('\\').ignore_then(any().map(|c: char| match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }));
    let plain = any().filter(move |c: &char| *c != quote && *c != '\\');

    just(quote)
        .ignore_then(plain.or(escape).repeated().collect::<String>())
        .then_ignore(just(quote))
        .labelled("quoted name")
}

fn index<'src>() -> impl Parser<'src, &'src str, usize, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .to_slice()
        .try_map(|s: &str, span| {
            s.parse::<usize>()
                .map_err(|_| Rich::custom(span, "index out of range"))
        })
        .labelled("index")
}
