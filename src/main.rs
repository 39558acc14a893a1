extern crate env_logger;
#[macro_use]
extern crate log;

use anyhow::Result;

mod cli;
mod counts;
mod filter;
mod io;
mod retrieve;
mod summary;
mod whitelist;

use cli::Cli;
use filter::ReadLayout;
use retrieve::RetrieveOpts;

fn try_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse_args();

    info!("cellsieve v{}", cli::VERSION);

    let opts = RetrieveOpts {
        layout: ReadLayout::new(cli.barcode_len, cli.offset)?,
        table: cli.table_enabled(),
        whitelist: cli.bc,
        cells: cli.cells,
        fastq: cli.fq,
        prefix: cli.output,
        summary: cli.summary,
    };

    retrieve::retrieve(&opts)?;
    info!("Completed successfully.");

    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        std::process::exit(1);
    }
}
