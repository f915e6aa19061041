/// Display version information
pub fn execute() {
    println!("dashvote {}", env!("CARGO_PKG_VERSION"));
    println!("Proposal dashboard and batch provisioning CLI");
}
