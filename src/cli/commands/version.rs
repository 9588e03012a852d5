use console::style;

pub fn execute() {
    println!(
        "{} {}",
        style("StackUp").cyan().bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
    );
}
