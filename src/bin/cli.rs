//! flatdb - CLI Client
//!
//! An interactive REPL: each input line is either a `.` meta-command or
//! a SQL statement passed verbatim to the database.

use std::io::{self, Write};

use flatdb::executor::QueryResult;
use flatdb::storage::Value;
use flatdb::Database;

/// Print welcome banner
fn print_banner() {
    println!(
        r#"
  __ _       _      _ _
 / _| | __ _| |_ __| | |__
| |_| |/ _` | __/ _` | '_ \
|  _| | (_| | || (_| | |_) |
|_| |_|\__,_|\__\__,_|_.__/

 A small file-backed relational database engine
 Type '.help' for help, '.quit' to exit
"#
    );
}

/// Print help message
fn print_help() {
    println!(
        r#"
Commands:
  .help              Show this help message
  .quit              Exit flatdb
  .tables            List all tables
  .schema <table>    Show table schema

SQL Commands:
  CREATE TABLE ...   Create a new table
  DROP TABLE ...     Drop a table
  INSERT INTO ...    Insert a row
  SELECT ...         Query data
  UPDATE ...         Update rows
  DELETE FROM ...    Delete rows

Examples:
  CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(50))
  INSERT INTO users VALUES (1, 'Alice')
  SELECT * FROM users WHERE id = 1
  SELECT u.name FROM users INNER JOIN orders ON users.id = orders.uid
"#
    );
}

/// Format a result set as an aligned table
fn format_results(columns: &[String], rows: &[Vec<Value>]) -> String {
    if rows.is_empty() {
        return "(no rows)\n".to_string();
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    for row in rows {
        for (i, value) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(value.to_string().len());
            }
        }
    }

    let mut output = String::new();

    let header: String = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<width$}", c, width = *w))
        .collect::<Vec<_>>()
        .join(" | ");
    output.push_str(&header);
    output.push('\n');
    output.push_str(&"-".repeat(header.len()));
    output.push('\n');

    for row in rows {
        let line: String = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v.to_string(), width = *w))
            .collect::<Vec<_>>()
            .join(" | ");
        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Render one query result
fn print_result(result: &QueryResult) {
    match &result.rows {
        Some(rows) => {
            print!("{}", format_results(&result.columns, rows));
            println!(
                "({} row{})",
                result.rowcount,
                if result.rowcount == 1 { "" } else { "s" }
            );
        }
        None => println!(
            "Query OK, {} row{} affected",
            result.rowcount,
            if result.rowcount == 1 { "" } else { "s" }
        ),
    }
}

/// Handle special dot commands; returns false when the REPL should exit
fn handle_special_command(cmd: &str, db: &Database) -> bool {
    let parts: Vec<&str> = cmd.split_whitespace().collect();

    match parts.first().copied() {
        Some(".help") => print_help(),
        Some(".quit") | Some(".exit") => {
            println!("Goodbye!");
            return false;
        }
        Some(".tables") => match db.list_tables() {
            Ok(tables) if tables.is_empty() => println!("No tables found."),
            Ok(tables) => {
                println!("Tables:");
                for table in tables {
                    println!("  {}", table);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        },
        Some(".schema") => match parts.get(1) {
            Some(table) => match db.table_info(table) {
                Ok(info) => println!("{}", info),
                Err(e) => eprintln!("Error: {}", e),
            },
            None => eprintln!("Usage: .schema <table>"),
        },
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            eprintln!("Type '.help' for available commands.");
        }
        None => {}
    }
    true
}

/// Main REPL loop
fn run_repl(db_path: &str) -> io::Result<()> {
    let mut db = match Database::open(db_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Cannot open database at '{}': {}", db_path, e);
            std::process::exit(1);
        }
    };

    print_banner();

    loop {
        print!("flatdb> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            println!("\nGoodbye!");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('.') {
            if !handle_special_command(trimmed, &db) {
                break;
            }
            continue;
        }

        match db.execute(trimmed) {
            Ok(result) => print_result(&result),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    db.close();
    Ok(())
}

fn main() -> io::Result<()> {
    env_logger::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());
    run_repl(&db_path)
}
