use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use salary_insights::config::CleaningConfig;
use salary_insights::pipeline::CleaningPipeline;
use salary_insights::report;
use salary_insights::warehouse::{InMemoryWarehouse, WarehouseConfig, WarehouseGateway};

#[derive(Parser)]
#[command(name = "salary_insights")]
#[command(about = "Tech salary survey cleaning pipeline and warehouse loader")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct CleaningArgs {
    /// Path to a TOML file with cleaning settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Null fraction above which a column is dropped (overrides config)
    #[arg(long)]
    missing_threshold: Option<f64>,
    /// Cap enforced on compensation columns (overrides config)
    #[arg(long)]
    salary_ceiling: Option<f64>,
}

#[derive(Args, Clone)]
struct WarehouseArgs {
    /// Warehouse project identifier
    #[arg(long, default_value = "tech-salary-insights")]
    project: String,
    /// Warehouse dataset identifier
    #[arg(long, default_value = "tech_salaries_dataset")]
    dataset: String,
    /// Destination table name
    #[arg(long, default_value = "cleaned_salaries")]
    table: String,
}

#[derive(Args, Clone)]
struct ReportArgs {
    /// Column to group by
    #[arg(long, default_value = "job_title_category")]
    category_column: String,
    /// Numeric column to average
    #[arg(long, default_value = "annual_base_pay")]
    value_column: String,
    /// Where to write the chart
    #[arg(long, default_value = "output/avg_salary.svg")]
    chart: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the cleaning pipeline: raw CSV in, cleaned CSV out
    Clean {
        /// Raw survey CSV
        #[arg(long)]
        input: PathBuf,
        /// Where to write the cleaned CSV
        #[arg(long)]
        output: PathBuf,
        #[command(flatten)]
        cleaning: CleaningArgs,
    },
    /// Bulk-load a cleaned CSV into the warehouse
    Load {
        /// Cleaned CSV to load
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        warehouse: WarehouseArgs,
    },
    /// Query the warehouse and render the salary bar chart
    Report {
        /// Cleaned CSV to stage into the dev warehouse before querying
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        warehouse: WarehouseArgs,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Run clean, load, and report sequentially
    Run {
        /// Raw survey CSV
        #[arg(long)]
        input: PathBuf,
        /// Where to write the cleaned CSV
        #[arg(long, default_value = "output/cleaned_tech_salaries.csv")]
        output: PathBuf,
        #[command(flatten)]
        cleaning: CleaningArgs,
        #[command(flatten)]
        warehouse: WarehouseArgs,
        #[command(flatten)]
        report: ReportArgs,
    },
}

fn resolve_cleaning_config(args: &CleaningArgs) -> anyhow::Result<CleaningConfig> {
    let mut config = match &args.config {
        Some(path) => CleaningConfig::load(path)?,
        None => CleaningConfig::default(),
    };
    if let Some(threshold) = args.missing_threshold {
        config.missing_threshold = threshold;
    }
    if let Some(ceiling) = args.salary_ceiling {
        config.salary_ceiling = ceiling;
    }
    config.validate()?;
    Ok(config)
}

fn run_clean(input: &PathBuf, output: &PathBuf, cleaning: &CleaningArgs) -> anyhow::Result<()> {
    let pipeline = CleaningPipeline::new(resolve_cleaning_config(cleaning)?)?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let report = pipeline.run_file(input, output)?;
    println!("\n📊 Cleaning results:");
    println!("   Rows: {} -> {}", report.rows_in, report.rows_out);
    println!("   Columns: {} -> {}", report.columns_in, report.columns_out);
    if !report.pruned_columns.is_empty() {
        println!("   Pruned columns: {}", report.pruned_columns.join(", "));
    }
    println!(
        "   Rows removed during cleaning: {}",
        report.rows_removed_by_validation
    );
    println!("   Output file: {}", output.display());
    Ok(())
}

async fn run_load(
    gateway: &dyn WarehouseGateway,
    input: &PathBuf,
    config: &WarehouseConfig,
    table: &str,
) -> anyhow::Result<String> {
    let destination = config.qualified_destination(table);
    let bytes = std::fs::read(input)?;
    gateway.load(&bytes, &destination).await?;
    info!(destination = %destination, "warehouse load finished");
    println!("✅ Loaded {} into {}", input.display(), destination);
    Ok(destination)
}

async fn run_report(
    gateway: &dyn WarehouseGateway,
    destination: &str,
    args: &ReportArgs,
) -> anyhow::Result<()> {
    let sql = format!(
        "SELECT {category}, AVG({value}) AS avg_{value} FROM `{destination}` \
         GROUP BY {category} ORDER BY avg_{value} DESC",
        category = args.category_column,
        value = args.value_column,
        destination = destination,
    );
    let result = gateway.query(&sql).await?;

    if let Some(parent) = args.chart.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let title = format!(
        "Average {} by {}",
        args.value_column, args.category_column
    );
    report::render(
        &result,
        &args.category_column,
        &format!("avg_{}", args.value_column),
        &title,
        &args.chart,
    )?;
    println!("✅ Chart written to {}", args.chart.display());
    Ok(())
}

fn warehouse_config(args: &WarehouseArgs) -> WarehouseConfig {
    WarehouseConfig {
        project: args.project.clone(),
        dataset: args.dataset.clone(),
        credentials_path: None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    salary_insights::logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean {
            input,
            output,
            cleaning,
        } => {
            println!("🧹 Running cleaning pipeline...");
            if let Err(e) = run_clean(&input, &output, &cleaning) {
                error!("Cleaning run failed: {}", e);
                return Err(e);
            }
        }
        Commands::Load { input, warehouse } => {
            println!("📥 Loading cleaned data into warehouse...");
            let gateway: Arc<dyn WarehouseGateway> = Arc::new(InMemoryWarehouse::new());
            let config = warehouse_config(&warehouse);
            run_load(gateway.as_ref(), &input, &config, &warehouse.table).await?;
        }
        Commands::Report {
            input,
            warehouse,
            report,
        } => {
            println!("📈 Building salary report...");
            let gateway: Arc<dyn WarehouseGateway> = Arc::new(InMemoryWarehouse::new());
            let config = warehouse_config(&warehouse);
            let destination =
                run_load(gateway.as_ref(), &input, &config, &warehouse.table).await?;
            run_report(gateway.as_ref(), &destination, &report).await?;
        }
        Commands::Run {
            input,
            output,
            cleaning,
            warehouse,
            report,
        } => {
            println!("🚀 Running full pipeline (clean + load + report)...");
            run_clean(&input, &output, &cleaning)?;

            let gateway: Arc<dyn WarehouseGateway> = Arc::new(InMemoryWarehouse::new());
            let config = warehouse_config(&warehouse);
            let destination =
                run_load(gateway.as_ref(), &output, &config, &warehouse.table).await?;
            run_report(gateway.as_ref(), &destination, &report).await?;
            println!("✅ Full pipeline completed successfully!");
        }
    }
    Ok(())
}
