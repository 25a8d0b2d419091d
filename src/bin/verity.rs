// Verity command-line entry point.
// Usage: verity run <suite.yaml> [--fail-on-error] | verity check <suite.yaml>

fn main() {
    verity::cli::run();
}
