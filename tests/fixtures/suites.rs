use crate::harness::get_tests;

macro_rules! test_suites {
    ($($name:ident => $path:expr),+ $(,)?) => {
        $(
            #[test]
            fn $name() {
                for test in get_tests($path) {
                    test.check();
                }
            }
        )+
    };
}

test_suites! {
    text => "text.json",
    attributes => "attributes.json",
    urls => "urls.json",
    scripts => "scripts.json",
    styles => "styles.json",
    errors => "errors.json",
}
