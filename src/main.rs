fn main() -> anyhow::Result<()> {
    wordtrain_lib::run()
}
