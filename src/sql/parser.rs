//! SQL Parser
//!
//! This module parses SQL text into command records. The grammar is
//! deliberately small: statements dispatch on their first keyword, and
//! clause boundaries are found by scanning for whole-word keywords
//! outside of quoted strings.

use super::command::{Command, CompareOp, Comparison, Condition, FromClause, JoinType};
use crate::catalog::{Column, DataType};
use crate::error::{Error, Result};
use crate::storage::Value;

/// Parse a single SQL statement into a command record
pub fn parse(sql: &str) -> Result<Command> {
    let sql = sql.trim().trim_end_matches(';').trim();
    let (first, _) = split_first_word(sql);

    match first.to_uppercase().as_str() {
        "CREATE" => parse_create_table(sql),
        "INSERT" => parse_insert(sql),
        "SELECT" => parse_select(sql),
        "UPDATE" => parse_update(sql),
        "DELETE" => parse_delete(sql),
        "DROP" => parse_drop_table(sql),
        _ => Err(Error::Parse(format!("unsupported SQL statement: {}", sql))),
    }
}

// ========== CREATE TABLE ==========

fn parse_create_table(sql: &str) -> Result<Command> {
    let rest = expect_keyword(sql, "CREATE")?;
    let rest = expect_keyword(rest, "TABLE")?;

    let open = rest
        .find('(')
        .ok_or_else(|| Error::Parse("CREATE TABLE requires a column list".to_string()))?;
    let close = rest
        .rfind(')')
        .filter(|&c| c > open)
        .ok_or_else(|| Error::Parse("unclosed column list in CREATE TABLE".to_string()))?;

    let table = identifier(&rest[..open])?;

    let mut columns = Vec::new();
    for def in split_top_level(&rest[open + 1..close]) {
        if def.is_empty() {
            continue;
        }
        columns.push(parse_column_def(&def)?);
    }
    if columns.is_empty() {
        return Err(Error::Parse(
            "CREATE TABLE requires at least one column".to_string(),
        ));
    }

    Ok(Command::CreateTable { table, columns })
}

/// Parse one column definition:
/// `<name> <type>[(<len>)] [PRIMARY KEY | UNIQUE] [NOT NULL]`
fn parse_column_def(def: &str) -> Result<Column> {
    let upper = def.to_uppercase();
    let tokens: Vec<&str> = def.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(Error::Parse(format!("invalid column definition '{}'", def)));
    }

    let name = identifier(tokens[0])?;

    let type_token = tokens[1];
    let (type_name, length) = if let Some(paren) = type_token.find('(') {
        let inner = type_token[paren + 1..].trim_end_matches(')');
        (&type_token[..paren], Some(parse_length(inner, def)?))
    } else if tokens.len() > 2 && tokens[2].starts_with('(') {
        let inner = tokens[2].trim_start_matches('(').trim_end_matches(')');
        (type_token, Some(parse_length(inner, def)?))
    } else {
        (type_token, None)
    };
    let dtype = DataType::from_sql_name(type_name)?;

    let primary_key = upper.contains("PRIMARY KEY");
    Ok(Column {
        name,
        dtype,
        length,
        primary_key,
        unique: primary_key || upper.contains("UNIQUE"),
        nullable: !upper.contains("NOT NULL"),
    })
}

fn parse_length(inner: &str, def: &str) -> Result<usize> {
    inner
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::Parse(format!("invalid length in column definition '{}'", def)))
}

// ========== INSERT ==========

fn parse_insert(sql: &str) -> Result<Command> {
    let rest = expect_keyword(sql, "INSERT")?;
    let rest = expect_keyword(rest, "INTO")?;
    let (table, rest) = take_identifier(rest)?;

    // Optional column list
    let (columns, rest) = if let Some(stripped) = rest.strip_prefix('(') {
        let close = stripped
            .find(')')
            .ok_or_else(|| Error::Parse("unclosed column list in INSERT".to_string()))?;
        let cols = stripped[..close]
            .split(',')
            .map(identifier)
            .collect::<Result<Vec<_>>>()?;
        (Some(cols), stripped[close + 1..].trim_start())
    } else {
        (None, rest)
    };

    let rest = expect_keyword(rest, "VALUES")?;
    let open = rest
        .find('(')
        .ok_or_else(|| Error::Parse("INSERT requires a VALUES list".to_string()))?;
    let close = rest
        .rfind(')')
        .filter(|&c| c > open)
        .ok_or_else(|| Error::Parse("unclosed VALUES list in INSERT".to_string()))?;

    let values: Vec<Value> = split_quoted(&rest[open + 1..close])
        .iter()
        .map(|raw| parse_literal(raw))
        .collect();

    if let Some(cols) = &columns {
        if cols.len() != values.len() {
            return Err(Error::ColumnCountMismatch {
                expected: cols.len(),
                found: values.len(),
            });
        }
    }

    Ok(Command::Insert {
        table,
        columns,
        values,
    })
}

// ========== SELECT ==========

fn parse_select(sql: &str) -> Result<Command> {
    let rest = expect_keyword(sql, "SELECT")?;

    let from_pos = find_keyword(rest, "FROM")
        .ok_or_else(|| Error::Parse("SELECT requires a FROM clause".to_string()))?;
    let cols_str = rest[..from_pos].trim();
    if cols_str.is_empty() {
        return Err(Error::Parse("SELECT requires a column list".to_string()));
    }
    let after_from = &rest[from_pos + "FROM".len()..];

    let where_pos = find_keyword(after_from, "WHERE");
    let order_pos = find_keyword(after_from, "ORDER BY");

    let from_end = [where_pos, order_pos]
        .iter()
        .flatten()
        .copied()
        .min()
        .unwrap_or(after_from.len());
    let from = parse_from_clause(after_from[..from_end].trim())?;

    let where_clause = match where_pos {
        Some(pos) => {
            let start = pos + "WHERE".len();
            let end = order_pos.filter(|&o| o > pos).unwrap_or(after_from.len());
            Some(parse_where(after_from[start..end].trim())?)
        }
        None => None,
    };

    let columns = if cols_str == "*" {
        vec!["*".to_string()]
    } else {
        split_selectors(cols_str)?
    };

    let order_by = match order_pos {
        Some(pos) => Some(split_selectors(
            after_from[pos + "ORDER BY".len()..].trim(),
        )?),
        None => None,
    };

    Ok(Command::Select {
        columns,
        from,
        where_clause,
        order_by,
    })
}

/// Split a comma-separated list of column selectors, folding each to
/// lower case. A selector may be qualified as `table.col`.
fn split_selectors(input: &str) -> Result<Vec<String>> {
    input
        .split(',')
        .map(|s| {
            let s = s.trim();
            if s.is_empty() {
                Err(Error::Parse(format!("empty column selector in '{}'", input)))
            } else {
                Ok(s.to_lowercase())
            }
        })
        .collect()
}

fn parse_from_clause(from_str: &str) -> Result<FromClause> {
    const JOIN_KINDS: [(&str, JoinType); 3] = [
        ("INNER JOIN", JoinType::Inner),
        ("LEFT JOIN", JoinType::Left),
        ("RIGHT JOIN", JoinType::Right),
    ];

    for (keyword, join_type) in JOIN_KINDS {
        if let Some(pos) = find_keyword(from_str, keyword) {
            return parse_join(from_str, pos, keyword.len(), join_type);
        }
    }

    let (table, rest) = take_identifier(from_str)?;
    if !rest.is_empty() {
        return Err(Error::Parse(format!("invalid FROM clause: {}", from_str)));
    }
    Ok(FromClause::Table(table))
}

/// Parse `<t1> <kind> JOIN <t2> ON <t1>.<c> = <t2>.<c>`.
///
/// The ON clause must be a single equality naming the two tables in
/// declared order.
fn parse_join(
    from_str: &str,
    join_pos: usize,
    keyword_len: usize,
    join_type: JoinType,
) -> Result<FromClause> {
    let left = identifier(&from_str[..join_pos])?;

    let rest = &from_str[join_pos + keyword_len..];
    let on_pos = find_keyword(rest, "ON")
        .ok_or_else(|| Error::Parse("JOIN requires an ON clause".to_string()))?;
    let right = identifier(&rest[..on_pos])?;
    let on_clause = rest[on_pos + "ON".len()..].trim();

    let (lhs, rhs) = on_clause
        .split_once('=')
        .ok_or_else(|| Error::Parse(format!("invalid ON clause: {}", on_clause)))?;
    let (left_ref, left_column) = split_qualified(lhs)?;
    let (right_ref, right_column) = split_qualified(rhs)?;

    if left_ref != left {
        return Err(Error::Parse(format!(
            "left table reference mismatch: {} != {}",
            left_ref, left
        )));
    }
    if right_ref != right {
        return Err(Error::Parse(format!(
            "right table reference mismatch: {} != {}",
            right_ref, right
        )));
    }

    Ok(FromClause::Join {
        join_type,
        left,
        right,
        left_column,
        right_column,
    })
}

fn split_qualified(s: &str) -> Result<(String, String)> {
    let (table, column) = s
        .trim()
        .split_once('.')
        .ok_or_else(|| Error::Parse(format!("ON clause must use table.column: {}", s.trim())))?;
    Ok((identifier(table)?, identifier(column)?))
}

// ========== WHERE ==========

/// Parse a WHERE clause: a flat AND list, a flat OR list, or a single
/// condition. Mixing AND and OR is not supported.
pub fn parse_where(input: &str) -> Result<Condition> {
    let and_parts = split_keyword(input, "AND");
    if and_parts.len() > 1 {
        let conditions = and_parts
            .iter()
            .map(|part| parse_condition(part).map(Condition::Compare))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Condition::And(conditions));
    }

    let or_parts = split_keyword(input, "OR");
    if or_parts.len() > 1 {
        let conditions = or_parts
            .iter()
            .map(|part| parse_condition(part).map(Condition::Compare))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Condition::Or(conditions));
    }

    Ok(Condition::Compare(parse_condition(input)?))
}

/// Parse a single `<col> <op> <literal>` condition. The column may be
/// qualified as `table.col`.
fn parse_condition(input: &str) -> Result<Comparison> {
    let input = input.trim();

    let mut end = word_end(input, 0);
    if end == 0 {
        return Err(Error::Parse(format!("invalid condition: {}", input)));
    }
    if input[end..].starts_with('.') {
        let qualified_end = word_end(input, end + 1);
        if qualified_end == end + 1 {
            return Err(Error::Parse(format!("invalid condition: {}", input)));
        }
        end = qualified_end;
    }
    let column = input[..end].to_lowercase();
    let rest = input[end..].trim_start();

    let (op_str, rest) = if rest.starts_with(">=") || rest.starts_with("<=") || rest.starts_with("!=")
    {
        rest.split_at(2)
    } else if rest.starts_with('=') || rest.starts_with('>') || rest.starts_with('<') {
        rest.split_at(1)
    } else {
        let word = word_end(rest, 0);
        if word == 0 {
            return Err(Error::Parse(format!("invalid condition: {}", input)));
        }
        rest.split_at(word)
    };
    let op = CompareOp::from_sql(op_str)?;

    let raw_value = rest.trim();
    if raw_value.is_empty() {
        return Err(Error::Parse(format!("missing literal in condition: {}", input)));
    }

    Ok(Comparison {
        column,
        op,
        value: parse_literal(raw_value),
    })
}

// ========== UPDATE ==========

fn parse_update(sql: &str) -> Result<Command> {
    let rest = expect_keyword(sql, "UPDATE")?;
    let (table, rest) = take_identifier(rest)?;
    let rest = expect_keyword(rest, "SET")?;

    let where_pos = find_keyword(rest, "WHERE")
        .ok_or_else(|| Error::Parse("UPDATE requires a WHERE clause".to_string()))?;
    let set_str = rest[..where_pos].trim();
    let where_str = rest[where_pos + "WHERE".len()..].trim();

    let mut assignments = Vec::new();
    for part in split_quoted(set_str) {
        let (column, value) = part
            .split_once('=')
            .ok_or_else(|| Error::Parse(format!("invalid assignment '{}'", part)))?;
        assignments.push((identifier(column)?, parse_literal(value.trim())));
    }
    if assignments.is_empty() {
        return Err(Error::Parse(
            "UPDATE requires at least one assignment".to_string(),
        ));
    }

    Ok(Command::Update {
        table,
        assignments,
        where_clause: parse_condition(where_str)?,
    })
}

// ========== DELETE ==========

fn parse_delete(sql: &str) -> Result<Command> {
    let rest = expect_keyword(sql, "DELETE")?;
    let rest = expect_keyword(rest, "FROM")?;
    let (table, rest) = take_identifier(rest)?;

    let where_clause = if rest.is_empty() {
        None
    } else {
        let rest = expect_keyword(rest, "WHERE")?;
        Some(parse_condition(rest)?)
    };

    Ok(Command::Delete {
        table,
        where_clause,
    })
}

// ========== DROP TABLE ==========

fn parse_drop_table(sql: &str) -> Result<Command> {
    let rest = expect_keyword(sql, "DROP")?;
    let rest = expect_keyword(rest, "TABLE")?;
    let (table, rest) = take_identifier(rest)?;
    if !rest.is_empty() {
        return Err(Error::Parse(format!("invalid DROP TABLE syntax: {}", sql)));
    }
    Ok(Command::DropTable { table })
}

// ========== Literals ==========

/// Parse a literal as written in SQL. Shared between INSERT values and
/// WHERE comparisons.
///
/// `NULL` is null; quoted text (either quote kind, doubled-quote
/// escape) is a string with the quotes stripped; `TRUE`/`FALSE` are
/// booleans; decimal integers and `d.d` floats are numeric; anything
/// else is kept as a string.
pub fn parse_literal(raw: &str) -> Value {
    let v = raw.trim();

    if v.eq_ignore_ascii_case("NULL") {
        return Value::Null;
    }

    for quote in ['\'', '"'] {
        if v.len() >= 2 && v.starts_with(quote) && v.ends_with(quote) {
            let inner = &v[1..v.len() - 1];
            let doubled = quote.to_string().repeat(2);
            return Value::String(inner.replace(&doubled, &quote.to_string()));
        }
    }

    if v.eq_ignore_ascii_case("TRUE") {
        return Value::Boolean(true);
    }
    if v.eq_ignore_ascii_case("FALSE") {
        return Value::Boolean(false);
    }

    if is_integer_literal(v) {
        if let Ok(n) = v.parse::<i64>() {
            return Value::Integer(n);
        }
    }
    if is_float_literal(v) {
        if let Ok(n) = v.parse::<f64>() {
            return Value::Float(n);
        }
    }

    Value::String(v.to_string())
}

/// `^-?\d+$`
fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `^-?\d+\.\d+$`
fn is_float_literal(s: &str) -> bool {
    match s.split_once('.') {
        Some((whole, frac)) => is_integer_literal(whole) && !frac.is_empty()
            && frac.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

// ========== Scanning helpers ==========

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte index of the first non-word byte at or after `start`
fn word_end(input: &str, start: usize) -> usize {
    input.as_bytes()[start..]
        .iter()
        .position(|&b| !is_word_byte(b))
        .map(|pos| start + pos)
        .unwrap_or(input.len())
}

/// Split off the first whitespace-delimited word
fn split_first_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(pos) => (&input[..pos], input[pos..].trim_start()),
        None => (input, ""),
    }
}

/// Consume the expected keyword (case-insensitive) at the start of the
/// input and return the remainder
fn expect_keyword<'a>(input: &'a str, keyword: &str) -> Result<&'a str> {
    let input = input.trim_start();
    let bytes = input.as_bytes();
    let klen = keyword.len();
    if bytes.len() >= klen
        && bytes[..klen].eq_ignore_ascii_case(keyword.as_bytes())
        && bytes.get(klen).map_or(true, |&b| !is_word_byte(b))
    {
        Ok(input[klen..].trim_start())
    } else {
        Err(Error::Parse(format!("expected {} near: {}", keyword, input)))
    }
}

/// Consume a leading identifier, folding it to lower case
fn take_identifier(input: &str) -> Result<(String, &str)> {
    let input = input.trim_start();
    let end = word_end(input, 0);
    if end == 0 {
        return Err(Error::Parse(format!("expected identifier near: {}", input)));
    }
    Ok((input[..end].to_lowercase(), input[end..].trim_start()))
}

/// Validate and lower-case a bare identifier
fn identifier(s: &str) -> Result<String> {
    let t = s.trim();
    if !t.is_empty() && t.bytes().all(is_word_byte) {
        Ok(t.to_lowercase())
    } else {
        Err(Error::Parse(format!("invalid identifier '{}'", t)))
    }
}

/// Find a whole-word keyword (case-insensitive) outside quoted strings
fn find_keyword(input: &str, keyword: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let kw = keyword.as_bytes();
    let mut in_quotes = false;
    let mut quote_char = 0u8;

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if in_quotes {
            if b == quote_char {
                in_quotes = false;
            }
            i += 1;
            continue;
        }
        if b == b'\'' || b == b'"' {
            in_quotes = true;
            quote_char = b;
            i += 1;
            continue;
        }
        if i + kw.len() <= bytes.len()
            && bytes[i..i + kw.len()].eq_ignore_ascii_case(kw)
            && (i == 0 || !is_word_byte(bytes[i - 1]))
            && bytes.get(i + kw.len()).map_or(true, |&b| !is_word_byte(b))
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Split on every occurrence of a whole-word keyword outside quotes
fn split_keyword<'a>(input: &'a str, keyword: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut rest = input;
    while let Some(pos) = find_keyword(rest, keyword) {
        parts.push(&rest[..pos]);
        rest = &rest[pos + keyword.len()..];
    }
    parts.push(rest);
    parts
}

/// Split on commas outside one level of parenthesis nesting
fn split_top_level(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for ch in input.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// Split on commas outside quoted strings. A doubled quote of the
/// current kind stays in the segment and is collapsed later by
/// `parse_literal`.
fn split_quoted(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quote_char = ' ';

    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if (ch == '\'' || ch == '"') && (!in_quotes || ch == quote_char) {
            if i + 1 < chars.len() && chars[i + 1] == ch {
                current.push(ch);
                current.push(ch);
                i += 2;
                continue;
            }
            in_quotes = !in_quotes;
            quote_char = ch;
            current.push(ch);
        } else if ch == ',' && !in_quotes {
            parts.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
        i += 1;
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table() {
        let cmd = parse(
            "CREATE TABLE Users (Id INT PRIMARY KEY, Name VARCHAR(50) NOT NULL, email TEXT UNIQUE, active BOOL)",
        )
        .unwrap();

        let Command::CreateTable { table, columns } = cmd else {
            panic!("expected CreateTable");
        };
        assert_eq!(table, "users");
        assert_eq!(columns.len(), 4);

        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].dtype, DataType::Integer);
        assert!(columns[0].primary_key);
        assert!(columns[0].unique);

        assert_eq!(columns[1].name, "name");
        assert_eq!(columns[1].length, Some(50));
        assert!(!columns[1].nullable);

        assert_eq!(columns[2].dtype, DataType::Varchar);
        assert!(columns[2].unique);
        assert!(!columns[2].primary_key);

        assert_eq!(columns[3].dtype, DataType::Boolean);
        assert!(columns[3].nullable);
    }

    #[test]
    fn test_create_table_unknown_type() {
        assert!(matches!(
            parse("CREATE TABLE t (x BLOB)"),
            Err(Error::UnknownDataType(_))
        ));
    }

    #[test]
    fn test_create_table_length_as_separate_token() {
        let cmd = parse("CREATE TABLE t (name VARCHAR (20))").unwrap();
        let Command::CreateTable { columns, .. } = cmd else {
            panic!();
        };
        assert_eq!(columns[0].length, Some(20));
    }

    #[test]
    fn test_insert_positional() {
        let cmd = parse("INSERT INTO users VALUES (1, 'Alice', TRUE, NULL)").unwrap();
        let Command::Insert {
            table,
            columns,
            values,
        } = cmd
        else {
            panic!("expected Insert");
        };
        assert_eq!(table, "users");
        assert!(columns.is_none());
        assert_eq!(
            values,
            vec![
                Value::Integer(1),
                Value::String("Alice".into()),
                Value::Boolean(true),
                Value::Null,
            ]
        );
    }

    #[test]
    fn test_insert_with_columns() {
        let cmd = parse("INSERT INTO users (id, Name) VALUES (2, \"Bob\")").unwrap();
        let Command::Insert {
            columns, values, ..
        } = cmd
        else {
            panic!();
        };
        assert_eq!(columns, Some(vec!["id".to_string(), "name".to_string()]));
        assert_eq!(values[1], Value::String("Bob".into()));
    }

    #[test]
    fn test_insert_count_mismatch() {
        assert!(matches!(
            parse("INSERT INTO users (id, name) VALUES (1)"),
            Err(Error::ColumnCountMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_insert_quoted_commas_and_escapes() {
        let cmd = parse("INSERT INTO t VALUES ('a, b', 'it''s', -7, 2.5)").unwrap();
        let Command::Insert { values, .. } = cmd else {
            panic!();
        };
        assert_eq!(values[0], Value::String("a, b".into()));
        assert_eq!(values[1], Value::String("it's".into()));
        assert_eq!(values[2], Value::Integer(-7));
        assert_eq!(values[3], Value::Float(2.5));
    }

    #[test]
    fn test_select_star() {
        let cmd = parse("SELECT * FROM users;").unwrap();
        let Command::Select {
            columns,
            from,
            where_clause,
            order_by,
        } = cmd
        else {
            panic!();
        };
        assert_eq!(columns, vec!["*"]);
        assert_eq!(from, FromClause::Table("users".to_string()));
        assert!(where_clause.is_none());
        assert!(order_by.is_none());
    }

    #[test]
    fn test_select_with_where_and_order() {
        let cmd = parse("SELECT Name, id FROM users WHERE id > 1 ORDER BY Name, id").unwrap();
        let Command::Select {
            columns,
            where_clause,
            order_by,
            ..
        } = cmd
        else {
            panic!();
        };
        assert_eq!(columns, vec!["name", "id"]);
        assert_eq!(order_by, Some(vec!["name".to_string(), "id".to_string()]));
        assert_eq!(
            where_clause,
            Some(Condition::Compare(Comparison {
                column: "id".to_string(),
                op: CompareOp::Gt,
                value: Value::Integer(1),
            }))
        );
    }

    #[test]
    fn test_where_and_splits_on_whole_word() {
        let cmd = parse("SELECT * FROM t WHERE a = 1 AND b = 2").unwrap();
        let Command::Select { where_clause, .. } = cmd else {
            panic!();
        };
        let Some(Condition::And(conditions)) = where_clause else {
            panic!("expected And");
        };
        assert_eq!(conditions.len(), 2);
        assert_eq!(
            conditions[1],
            Condition::Compare(Comparison {
                column: "b".to_string(),
                op: CompareOp::Eq,
                value: Value::Integer(2),
            })
        );
    }

    #[test]
    fn test_where_or() {
        let cmd = parse("SELECT * FROM t WHERE a = 1 OR a = 2 OR a = 3").unwrap();
        let Command::Select { where_clause, .. } = cmd else {
            panic!();
        };
        let Some(Condition::Or(conditions)) = where_clause else {
            panic!("expected Or");
        };
        assert_eq!(conditions.len(), 3);
    }

    #[test]
    fn test_where_keyword_inside_quotes_ignored() {
        let cmd = parse("SELECT * FROM t WHERE name = 'where and or'").unwrap();
        let Command::Select { where_clause, .. } = cmd else {
            panic!();
        };
        assert_eq!(
            where_clause,
            Some(Condition::Compare(Comparison {
                column: "name".to_string(),
                op: CompareOp::Eq,
                value: Value::String("where and or".into()),
            }))
        );
    }

    #[test]
    fn test_where_like_and_in() {
        let cmd = parse("SELECT * FROM t WHERE name LIKE 'al%'").unwrap();
        let Command::Select { where_clause, .. } = cmd else {
            panic!();
        };
        let Some(Condition::Compare(cmp)) = where_clause else {
            panic!();
        };
        assert_eq!(cmp.op, CompareOp::Like);
        assert_eq!(cmp.value, Value::String("al%".into()));

        // IN parses but has no executor support
        let cmd = parse("SELECT * FROM t WHERE id IN (1, 2)").unwrap();
        let Command::Select { where_clause, .. } = cmd else {
            panic!();
        };
        let Some(Condition::Compare(cmp)) = where_clause else {
            panic!();
        };
        assert_eq!(cmp.op, CompareOp::In);
    }

    #[test]
    fn test_qualified_where_column() {
        let cmd = parse("SELECT * FROM t WHERE users.id = 1").unwrap();
        let Command::Select { where_clause, .. } = cmd else {
            panic!();
        };
        let Some(Condition::Compare(cmp)) = where_clause else {
            panic!();
        };
        assert_eq!(cmp.column, "users.id");
    }

    #[test]
    fn test_inner_join() {
        let cmd =
            parse("SELECT users.name, orders.oid FROM users INNER JOIN orders ON users.id = orders.uid")
                .unwrap();
        let Command::Select { columns, from, .. } = cmd else {
            panic!();
        };
        assert_eq!(columns, vec!["users.name", "orders.oid"]);
        assert_eq!(
            from,
            FromClause::Join {
                join_type: JoinType::Inner,
                left: "users".to_string(),
                right: "orders".to_string(),
                left_column: "id".to_string(),
                right_column: "uid".to_string(),
            }
        );
    }

    #[test]
    fn test_left_and_right_join() {
        let cmd = parse("SELECT * FROM a LEFT JOIN b ON a.x = b.y").unwrap();
        let Command::Select { from, .. } = cmd else {
            panic!();
        };
        assert!(matches!(
            from,
            FromClause::Join {
                join_type: JoinType::Left,
                ..
            }
        ));

        let cmd = parse("SELECT * FROM a RIGHT JOIN b ON a.x = b.y").unwrap();
        let Command::Select { from, .. } = cmd else {
            panic!();
        };
        assert!(matches!(
            from,
            FromClause::Join {
                join_type: JoinType::Right,
                ..
            }
        ));
    }

    #[test]
    fn test_join_table_order_enforced() {
        let err = parse("SELECT * FROM a INNER JOIN b ON b.y = a.x").unwrap_err();
        assert!(err.to_string().contains("mismatch"));
    }

    #[test]
    fn test_update() {
        let cmd = parse("UPDATE users SET name = 'Alicia', active = FALSE WHERE id = 1").unwrap();
        let Command::Update {
            table,
            assignments,
            where_clause,
        } = cmd
        else {
            panic!();
        };
        assert_eq!(table, "users");
        assert_eq!(
            assignments,
            vec![
                ("name".to_string(), Value::String("Alicia".into())),
                ("active".to_string(), Value::Boolean(false)),
            ]
        );
        assert_eq!(where_clause.column, "id");
        assert_eq!(where_clause.value, Value::Integer(1));
    }

    #[test]
    fn test_update_requires_where() {
        assert!(matches!(
            parse("UPDATE users SET name = 'x'"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_delete() {
        let cmd = parse("DELETE FROM users WHERE id != 3").unwrap();
        let Command::Delete {
            table,
            where_clause,
        } = cmd
        else {
            panic!();
        };
        assert_eq!(table, "users");
        let cmp = where_clause.unwrap();
        assert_eq!(cmp.op, CompareOp::Neq);

        let cmd = parse("DELETE FROM users").unwrap();
        let Command::Delete { where_clause, .. } = cmd else {
            panic!();
        };
        assert!(where_clause.is_none());
    }

    #[test]
    fn test_drop_table() {
        let cmd = parse("drop table Users").unwrap();
        assert_eq!(
            cmd,
            Command::DropTable {
                table: "users".to_string()
            }
        );
    }

    #[test]
    fn test_unsupported_statement() {
        assert!(matches!(parse("TRUNCATE users"), Err(Error::Parse(_))));
        assert!(matches!(parse(""), Err(Error::Parse(_))));
    }

    #[test]
    fn test_literal_typing() {
        assert_eq!(parse_literal("null"), Value::Null);
        assert_eq!(parse_literal("TRUE"), Value::Boolean(true));
        assert_eq!(parse_literal("-42"), Value::Integer(-42));
        assert_eq!(parse_literal("-4.5"), Value::Float(-4.5));
        // no exponent grammar, bare words stay strings
        assert_eq!(parse_literal("1e5"), Value::String("1e5".into()));
        assert_eq!(parse_literal("2025-01-01"), Value::String("2025-01-01".into()));
        assert_eq!(parse_literal("'2025-01-01'"), Value::String("2025-01-01".into()));
    }
}
