//! Database catalog - query building and inspection for the listings schema.
//!
//! These tools never touch a database. They produce parameterized SQL for
//! the marketplace backend and check caller-supplied SQL before it is run.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::parse_args;
use crate::application::{RegistryError, Tool, ToolContext, ToolError, ToolRegistry};
use crate::domain::foundation::ValidationError;
use crate::domain::tools::{ParamSpec, ParamType, ToolArguments, ToolDescriptor, ToolOutput};

pub const MAX_PAGE_SIZE: u32 = 100;

pub fn register(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register(BuildListingSearchQuery)?;
    registry.register(ValidateSqlQuery)?;
    registry.register(DescribeSchema)?;
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════════
// build_listing_search_query
// ════════════════════════════════════════════════════════════════════════════════

const SORTABLE_COLUMNS: &[&str] = &["created_at", "price", "title"];

#[derive(Debug, Deserialize)]
struct SearchArgs {
    category: Option<String>,
    location: Option<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    keywords: Option<String>,
    condition: Option<String>,
    sort_by: String,
    order: String,
    limit: u32,
    offset: u32,
}

/// Accumulates `WHERE` clauses with positional placeholders.
#[derive(Default)]
struct QueryBuilder {
    clauses: Vec<String>,
    parameters: Vec<Value>,
}

impl QueryBuilder {
    fn next_placeholder(&mut self, value: Value) -> String {
        self.parameters.push(value);
        format!("${}", self.parameters.len())
    }

    fn filter(&mut self, template: &str, value: Value) {
        let placeholder = self.next_placeholder(value);
        self.clauses.push(template.replace("{}", &placeholder));
    }
}

pub struct BuildListingSearchQuery;

const TOOL_BUILD: &str = "build_listing_search_query";

#[async_trait]
impl Tool for BuildListingSearchQuery {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            TOOL_BUILD,
            "Build a parameterized SELECT over active listings from search filters",
        )
        .param(ParamSpec::optional("category", ParamType::String, "Category slug"))
        .param(ParamSpec::optional("location", ParamType::String, "City or county"))
        .param(ParamSpec::optional("min_price", ParamType::Number, "Lowest price in RON"))
        .param(ParamSpec::optional("max_price", ParamType::Number, "Highest price in RON"))
        .param(ParamSpec::optional("keywords", ParamType::String, "Free-text search"))
        .param(ParamSpec::optional("condition", ParamType::String, "nou or folosit"))
        .param(
            ParamSpec::optional("sort_by", ParamType::String, "created_at, price or title")
                .with_default(json!("created_at")),
        )
        .param(
            ParamSpec::optional("order", ParamType::String, "asc or desc")
                .with_default(json!("desc")),
        )
        .param(
            ParamSpec::optional("limit", ParamType::Integer, "Page size, at most 100")
                .with_default(json!(20)),
        )
        .param(
            ParamSpec::optional("offset", ParamType::Integer, "Rows to skip")
                .with_default(json!(0)),
        )
        .returns(json!({"query": "string", "parameters": ["any"]}))
        .pure()
    }

    async fn call(&self, args: ToolArguments, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: SearchArgs = parse_args(TOOL_BUILD, &args)?;
        let invalid = |field: &str, reason: String| {
            ToolError::validation(TOOL_BUILD, ValidationError::invalid_value(field, reason))
        };

        if !SORTABLE_COLUMNS.contains(&args.sort_by.as_str()) {
            return Err(invalid(
                "sort_by",
                format!("must be one of {}", SORTABLE_COLUMNS.join(", ")),
            ));
        }
        let order = match args.order.to_lowercase().as_str() {
            "asc" => "ASC",
            "desc" => "DESC",
            _ => return Err(invalid("order", "must be asc or desc".to_string())),
        };
        if args.limit == 0 || args.limit > MAX_PAGE_SIZE {
            return Err(invalid("limit", format!("must be between 1 and {}", MAX_PAGE_SIZE)));
        }
        if let (Some(min), Some(max)) = (args.min_price, args.max_price) {
            if min > max {
                return Err(invalid("min_price", "is greater than max_price".to_string()));
            }
        }

        let mut builder = QueryBuilder::default();
        builder.filter("status = {}", json!("active"));
        if let Some(category) = args.category.filter(|c| !c.trim().is_empty()) {
            builder.filter("category = {}", json!(category.trim()));
        }
        if let Some(location) = args.location.filter(|l| !l.trim().is_empty()) {
            builder.filter("location ILIKE {}", json!(format!("%{}%", location.trim())));
        }
        if let Some(min) = args.min_price {
            builder.filter("price >= {}", json!(min));
        }
        if let Some(max) = args.max_price {
            builder.filter("price <= {}", json!(max));
        }
        if let Some(condition) = args.condition.filter(|c| !c.trim().is_empty()) {
            builder.filter("condition = {}", json!(condition.trim()));
        }
        if let Some(keywords) = args.keywords.filter(|k| !k.trim().is_empty()) {
            builder.filter(
                "(title ILIKE {} OR description ILIKE {})",
                json!(format!("%{}%", keywords.trim())),
            );
        }

        let limit = builder.next_placeholder(json!(args.limit));
        let offset = builder.next_placeholder(json!(args.offset));
        let query = format!(
            "SELECT id, title, price, currency, location, category, created_at FROM listings WHERE {} ORDER BY {} {} LIMIT {} OFFSET {}",
            builder.clauses.join(" AND "),
            args.sort_by,
            order,
            limit,
            offset
        );

        Ok(ToolOutput::Inline(json!({
            "query": query,
            "parameters": builder.parameters,
        })))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// validate_sql_query
// ════════════════════════════════════════════════════════════════════════════════

const WRITE_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "drop", "alter", "truncate", "create", "grant", "revoke",
    "merge", "copy",
];
const READ_KEYWORDS: &[&str] = &["select", "with", "show", "explain", "values"];

/// Removes `--` line comments and `/* */` block comments.
fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek().copied()) {
            ('-', Some('-')) => {
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = ' ';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

fn words(sql: &str) -> Vec<String> {
    sql.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[derive(Debug, Deserialize)]
struct SqlArgs {
    query: String,
}

pub struct ValidateSqlQuery;

#[async_trait]
impl Tool for ValidateSqlQuery {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "validate_sql_query",
            "Check whether a SQL statement is read-only and flag risky patterns",
        )
        .param(ParamSpec::required("query", ParamType::String, "SQL text"))
        .returns(json!({"read_only": "boolean", "statement": "string", "warnings": ["string"]}))
        .pure()
    }

    async fn call(&self, args: ToolArguments, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: SqlArgs = parse_args("validate_sql_query", &args)?;
        let cleaned = strip_comments(&args.query);
        let statements: Vec<&str> = cleaned
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if statements.is_empty() {
            return Err(ToolError::validation(
                "validate_sql_query",
                ValidationError::empty_field("query"),
            ));
        }

        let mut warnings = Vec::new();
        if statements.len() > 1 {
            warnings.push(format!("{} statements found; run one at a time", statements.len()));
        }

        let all_words = words(&cleaned);
        let first_words = words(statements[0]);
        let statement = first_words
            .first()
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());

        let writes: Vec<&str> = WRITE_KEYWORDS
            .iter()
            .copied()
            .filter(|kw| all_words.iter().any(|w| w == kw))
            .collect();
        let read_only = statements.len() == 1
            && READ_KEYWORDS.contains(&statement.as_str())
            && writes.is_empty();

        if !writes.is_empty() {
            warnings.push(format!("modifies data: {}", writes.join(", ")));
        }
        if statement == "select" {
            if cleaned.contains('*') && first_words.iter().any(|w| w == "from") {
                warnings.push("SELECT * returns every column; list the ones needed".to_string());
            }
            if !first_words.iter().any(|w| w == "limit") {
                warnings.push("no LIMIT clause".to_string());
            }
        }
        if (statement == "update" || statement == "delete")
            && !first_words.iter().any(|w| w == "where")
        {
            warnings.push(format!("{} without WHERE affects every row", statement.to_uppercase()));
        }

        Ok(ToolOutput::Inline(json!({
            "read_only": read_only,
            "statement": statement,
            "statement_count": statements.len(),
            "warnings": warnings,
        })))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// describe_schema
// ════════════════════════════════════════════════════════════════════════════════

/// (table, [(column, type, nullable)])
type TableSpec = (&'static str, &'static [(&'static str, &'static str, bool)]);

const SCHEMA: &[TableSpec] = &[
    (
        "listings",
        &[
            ("id", "uuid", false),
            ("user_id", "uuid", false),
            ("category", "text", false),
            ("title", "varchar(120)", false),
            ("description", "text", false),
            ("price", "numeric(12,2)", true),
            ("currency", "char(3)", false),
            ("location", "text", false),
            ("condition", "text", true),
            ("status", "text", false),
            ("latitude", "double precision", true),
            ("longitude", "double precision", true),
            ("created_at", "timestamptz", false),
            ("updated_at", "timestamptz", false),
        ],
    ),
    (
        "users",
        &[
            ("id", "uuid", false),
            ("email", "text", false),
            ("display_name", "text", false),
            ("phone", "text", true),
            ("city", "text", true),
            ("created_at", "timestamptz", false),
        ],
    ),
    (
        "categories",
        &[
            ("slug", "text", false),
            ("name", "text", false),
            ("parent_slug", "text", true),
        ],
    ),
    (
        "messages",
        &[
            ("id", "uuid", false),
            ("listing_id", "uuid", false),
            ("sender_id", "uuid", false),
            ("recipient_id", "uuid", false),
            ("body", "text", false),
            ("read_at", "timestamptz", true),
            ("created_at", "timestamptz", false),
        ],
    ),
];

fn table_json((name, columns): &TableSpec) -> Value {
    json!({
        "table": name,
        "columns": columns
            .iter()
            .map(|(column, ty, nullable)| json!({"name": column, "type": ty, "nullable": nullable}))
            .collect::<Vec<_>>(),
    })
}

#[derive(Debug, Deserialize)]
struct SchemaArgs {
    table: Option<String>,
}

pub struct DescribeSchema;

#[async_trait]
impl Tool for DescribeSchema {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("describe_schema", "List the columns of the marketplace tables")
            .param(ParamSpec::optional("table", ParamType::String, "Only this table"))
            .returns(json!({"tables": [{"table": "string", "columns": ["object"]}]}))
            .pure()
    }

    async fn call(&self, args: ToolArguments, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: SchemaArgs = parse_args("describe_schema", &args)?;
        let tables: Vec<Value> = match args.table {
            None => SCHEMA.iter().map(table_json).collect(),
            Some(wanted) => {
                let spec = SCHEMA
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(wanted.trim()))
                    .ok_or_else(|| {
                        ToolError::validation(
                            "describe_schema",
                            ValidationError::invalid_value(
                                "table",
                                format!("unknown table '{}'", wanted),
                            ),
                        )
                    })?;
                vec![table_json(spec)]
            }
        };
        Ok(ToolOutput::Inline(json!({ "tables": tables })))
    }
}
