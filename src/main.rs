fn main() -> anyhow::Result<()> {
    doc_search::cli::run()
}
