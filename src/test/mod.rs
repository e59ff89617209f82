mod metrics;
mod operator;
mod plan_spec;
mod sim_time;
