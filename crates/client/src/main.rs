fn main() -> anyhow::Result<()> {
    yardview_client::run()
}
