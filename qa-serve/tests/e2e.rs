mod e2e {
    mod common;
    mod execute;
    mod generate;
    mod stop;
}
