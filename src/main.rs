fn main() {
    dualshot_lib::run()
}
