pub mod bootstrap;
pub mod dry_run;
pub mod status;
