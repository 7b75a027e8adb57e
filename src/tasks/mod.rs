pub mod usage_run;
