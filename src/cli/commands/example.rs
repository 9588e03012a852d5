use crate::config::EXAMPLE_CONFIG;

pub fn execute() {
    print!("{}", EXAMPLE_CONFIG);
}
