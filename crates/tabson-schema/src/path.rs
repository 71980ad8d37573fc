use crate::error::SchemaError;

/// One navigation step of a compiled document path.
///
/// `a.b[0][2]` compiles to `[Key("a"), Key("b"), Index(0), Index(2)]`.
/// An empty bracket group `[]` compiles to `Append`: "add a new element
/// to the end of the array". On a trailing position it marks a `$push`
/// target; mid-path it appends an element and descends into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// Descend into an object field.
    Key(String),
    /// Descend into a list element by index.
    Index(usize),
    /// Append a new element to the end of a list.
    Append,
}

/// Compile a dot-notation document path into navigation steps.
///
/// The grammar is `segment ('.' segment)*` where a segment is a field
/// name, a field name followed by one or more bracket groups, or one or
/// more bare bracket groups (indexing the current node directly). An empty
/// path compiles to an empty step list; whether that is legal depends on
/// the mapping (see [`FieldMapping::compile`](crate::FieldMapping::compile)).
///
/// Interpolation of variables must happen before parsing — the compiler
/// never sees the row or the variable space.
pub fn parse_path(path: &str) -> Result<Vec<PathStep>, SchemaError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }

    let mut steps = Vec::new();
    for segment in path.split('.') {
        if segment.is_empty() {
            return Err(syntax(path, "empty path segment"));
        }

        let (name, brackets) = match segment.find('[') {
            Some(pos) => (&segment[..pos], &segment[pos..]),
            None => (segment, ""),
        };

        if name.contains(']') {
            return Err(syntax(path, "']' without a matching '['"));
        }
        if !name.is_empty() {
            steps.push(PathStep::Key(name.to_string()));
        }

        let mut rest = brackets;
        while !rest.is_empty() {
            let Some(tail) = rest.strip_prefix('[') else {
                return Err(syntax(path, "unexpected characters after ']'"));
            };
            let Some(close) = tail.find(']') else {
                return Err(syntax(path, "'[' without a matching ']'"));
            };
            let inner = tail[..close].trim();
            if inner.is_empty() {
                steps.push(PathStep::Append);
            } else {
                let index: usize = inner
                    .parse()
                    .map_err(|_| syntax(path, "array index is not an integer"))?;
                steps.push(PathStep::Index(index));
            }
            rest = &tail[close + 1..];
        }
    }

    Ok(steps)
}

fn syntax(path: &str, reason: &str) -> SchemaError {
    SchemaError::PathSyntax {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_dotted_path() {
        let steps = parse_path("a.b.c").unwrap();
        assert_eq!(
            steps,
            vec![
                PathStep::Key("a".into()),
                PathStep::Key("b".into()),
                PathStep::Key("c".into()),
            ]
        );
    }

    #[test]
    fn name_with_index_expands_to_two_steps() {
        let steps = parse_path("bob.fred[0].george").unwrap();
        assert_eq!(
            steps,
            vec![
                PathStep::Key("bob".into()),
                PathStep::Key("fred".into()),
                PathStep::Index(0),
                PathStep::Key("george".into()),
            ]
        );
    }

    #[test]
    fn bare_index_targets_current_node() {
        let steps = parse_path("[3].name").unwrap();
        assert_eq!(
            steps,
            vec![PathStep::Index(3), PathStep::Key("name".into())]
        );
    }

    #[test]
    fn adjacent_brackets_are_multi_dimensional() {
        let steps = parse_path("a[0][2]").unwrap();
        assert_eq!(
            steps,
            vec![
                PathStep::Key("a".into()),
                PathStep::Index(0),
                PathStep::Index(2),
            ]
        );
    }

    #[test]
    fn trailing_append_marker() {
        let steps = parse_path("events[]").unwrap();
        assert_eq!(steps, vec![PathStep::Key("events".into()), PathStep::Append]);
    }

    #[test]
    fn append_marker_mid_path() {
        let steps = parse_path("events[].kind").unwrap();
        assert_eq!(
            steps,
            vec![
                PathStep::Key("events".into()),
                PathStep::Append,
                PathStep::Key("kind".into()),
            ]
        );
    }

    #[test]
    fn empty_path_compiles_to_no_steps() {
        assert_eq!(parse_path("").unwrap(), Vec::<PathStep>::new());
    }

    #[test]
    fn index_with_whitespace() {
        let steps = parse_path("a[ 1 ]").unwrap();
        assert_eq!(steps, vec![PathStep::Key("a".into()), PathStep::Index(1)]);
    }

    #[test]
    fn unbalanced_open_bracket() {
        assert!(parse_path("a[0").is_err());
    }

    #[test]
    fn unbalanced_close_bracket() {
        assert!(parse_path("a]0").is_err());
    }

    #[test]
    fn non_integer_index() {
        assert!(parse_path("a[x]").is_err());
        assert!(parse_path("a[-1]").is_err());
    }

    #[test]
    fn empty_segment() {
        assert!(parse_path("a..b").is_err());
        assert!(parse_path(".a").is_err());
        assert!(parse_path("a.").is_err());
    }

    #[test]
    fn characters_between_bracket_groups() {
        assert!(parse_path("a[0]x[1]").is_err());
    }

    #[test]
    fn compiling_twice_yields_equal_steps() {
        let a = parse_path("x.y[1][2].z").unwrap();
        let b = parse_path("x.y[1][2].z").unwrap();
        assert_eq!(a, b);
    }
}
