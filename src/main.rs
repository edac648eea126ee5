mod aggregator;
mod calendar;
mod cli;
mod entry;
mod materializer;
mod schedule;
mod store;
mod vault;

fn main() {
    cli::run()
}
