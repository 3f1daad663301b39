//! acbledger - interactive adjusted-cost-base ledger.

fn main() -> std::process::ExitCode {
    acbledger::cmd::shell::main()
}
