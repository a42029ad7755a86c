//! Simple CLI for the block storage layer.
//!
//! Tables are addressed by the index of their metadata page.
//!
//! Usage:
//!   block_cli <db_path> create <name> <column:kind>...
//!   block_cli <db_path> insert <table> <value>...
//!   block_cli <db_path> update <table> <row_id> <value>...
//!   block_cli <db_path> scan <table>
//!   block_cli <db_path> last <table>
//!   block_cli <db_path> describe <table>
//!   block_cli <db_path> drop <table>
//!   block_cli <db_path> stats
//!
//! Set `BLOCK_PAGE_SIZE` to choose the page size of a new store file.

use block_storage::{
    Config, Db, FieldKind, PageIndex, Result, Row, StorageError, Table, TableDef, Value,
    DEFAULT_PAGE_SIZE,
};
use std::env;
use std::process::exit;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!("Usage: block_cli <db_path> <command> [args...]");
    eprintln!("Commands:");
    eprintln!("  create <name> <col:kind>...      - Create a table (kinds: int1..int8, text<N>)");
    eprintln!("  insert <table> <value>...        - Append a row");
    eprintln!("  update <table> <row_id> <value>... - Overwrite a row in place");
    eprintln!("  scan <table>                     - Print every row");
    eprintln!("  last <table>                     - Print the last row");
    eprintln!("  describe <table>                 - Print the table definition");
    eprintln!("  drop <table>                     - Drop a table");
    eprintln!("  stats                            - Show store statistics");
    exit(1);
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("ERROR: {}", e);
    exit(1);
}

fn arg<'a>(args: &'a [String], i: usize) -> &'a str {
    match args.get(i) {
        Some(a) => a.as_str(),
        None => usage(),
    }
}

fn parse_table(s: &str) -> PageIndex {
    match s.parse::<u32>() {
        Ok(n) => PageIndex::new(n),
        Err(_) => fail(format!("invalid table index: {}", s)),
    }
}

/// Convert command-line strings to values following the table's columns
fn parse_row(table: &Table, raw: &[String]) -> Result<Row> {
    let fields = table.schema().fields();
    if raw.len() != fields.len() {
        return Err(StorageError::ArityMismatch {
            expected: fields.len(),
            found: raw.len(),
        });
    }

    fields
        .iter()
        .zip(raw)
        .enumerate()
        .map(|(i, (kind, s))| match kind {
            FieldKind::Int { .. } => s.parse::<i64>().map(Value::Int).map_err(|_| {
                StorageError::TypeMismatch {
                    field: i,
                    expected: kind.to_string(),
                    found: format!("{:?}", s),
                }
            }),
            FieldKind::Text { .. } => Ok(Value::Text(s.clone())),
        })
        .collect()
}

fn print_row(row_id: usize, row: &Row) {
    let cols: Vec<String> = row.iter().map(|v| v.to_string()).collect();
    println!("{}: {}", row_id, cols.join(" | "));
}

fn run(db: &Db, args: &[String]) -> Result<()> {
    match arg(args, 2) {
        "create" => {
            let name = arg(args, 3);
            let specs: Vec<&str> = args[4..].iter().map(|s| s.as_str()).collect();
            if specs.is_empty() {
                usage();
            }
            let table = db.create_table(TableDef::from_specs(name, &specs)?)?;
            println!("TABLE: {}", table.meta_index());
        }

        "insert" => {
            let table = db.table(parse_table(arg(args, 3)))?;
            let row = parse_row(&table, &args[4..])?;
            println!("ROW: {}", table.insert(&row)?);
        }

        "update" => {
            let table = db.table(parse_table(arg(args, 3)))?;
            let row_id: u32 = arg(args, 4)
                .parse()
                .unwrap_or_else(|_| fail(format!("invalid row id: {}", args[4])));
            let row = parse_row(&table, &args[5..])?;
            table.update(row_id, &row)?;
            println!("OK");
        }

        "scan" => {
            let table = db.table(parse_table(arg(args, 3)))?;
            let rows = table.scan()?;
            println!("COUNT: {}", rows.len());
            for (i, row) in rows.iter().enumerate() {
                print_row(i, row);
            }
        }

        "last" => {
            let table = db.table(parse_table(arg(args, 3)))?;
            let count = table.row_count()? as usize;
            let row = table.last_row()?;
            print_row(count - 1, &row);
        }

        "describe" => {
            let table = db.table(parse_table(arg(args, 3)))?;
            println!("name: {}", table.name());
            for column in &table.def().columns {
                println!("  {} {}", column.name, column.kind);
            }
            println!("data_page: {}", table.data_index());
            println!("row_size: {}", table.schema().row_size());
            println!("rows: {}", table.row_count()?);
            println!("capacity_remaining: {}", table.capacity_remaining()?);
        }

        "drop" => {
            db.drop_table(parse_table(arg(args, 3)))?;
            println!("DROPPED");
        }

        "stats" => {
            let stats = db.stats();
            println!("page_size: {}", stats.page_size);
            println!("page_count: {}", stats.page_count);
            println!("free_pages: {}", stats.free_pages);
        }

        command => {
            eprintln!("Unknown command: {}", command);
            exit(1);
        }
    }
    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        usage();
    }

    let page_size = match env::var("BLOCK_PAGE_SIZE") {
        Ok(s) => s
            .parse()
            .unwrap_or_else(|_| fail(format!("invalid BLOCK_PAGE_SIZE: {}", s))),
        Err(_) => DEFAULT_PAGE_SIZE,
    };

    let db = match Db::open(Config::new(&args[1]).page_size(page_size)) {
        Ok(db) => db,
        Err(e) => fail(format!("Failed to open store: {}", e)),
    };

    if let Err(e) = run(&db, &args) {
        fail(e);
    }

    // Ensure data is persisted
    if let Err(e) = db.flush() {
        eprintln!("Warning: Failed to flush: {}", e);
    }
}
