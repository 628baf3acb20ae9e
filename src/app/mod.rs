mod runner;

pub(crate) use runner::run_probe;
