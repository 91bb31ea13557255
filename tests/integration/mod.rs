mod helpers;
mod test_plan;
mod test_publish;
mod test_setup;
