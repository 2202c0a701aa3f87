#[cfg(feature = "serde")]
mod serde_tests {
    use glimfmt::{FormatOptions, ParseErrorKind, Quote, Template};

    #[test]
    fn test_quote_serialization() {
        let quote = Quote::Single;
        let serialized = serde_json::to_string(&quote).unwrap();
        assert_eq!(serialized, r#""Single""#);

        let deserialized: Quote = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, quote);
    }

    #[test]
    fn test_format_options_round_trip() {
        let options = FormatOptions {
            print_width: 100,
            indent: 4,
            preferred_quote: Quote::Single,
        };

        let serialized = serde_json::to_string(&options).unwrap();
        let deserialized: FormatOptions = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized, options);
    }

    #[test]
    fn test_format_options_default_shape() {
        let serialized = serde_json::to_string(&FormatOptions::default()).unwrap();
        assert_eq!(
            serialized,
            r#"{"print_width":80,"indent":2,"preferred_quote":"Double"}"#
        );
    }

    #[test]
    fn test_parse_error_round_trip() {
        let err = glimfmt::parse("{{oops").unwrap_err();

        let serialized = serde_json::to_string(&err).unwrap();
        let deserialized: glimfmt::ParseError = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized, err);
        assert!(matches!(
            deserialized.kind,
            ParseErrorKind::UnexpectedEof { .. }
        ));
    }

    #[test]
    fn test_template_serialization() {
        let template = Template::new("Hello,  {{ name }}!".to_string()).unwrap();

        // Serialize the template
        let serialized = serde_json::to_string(&template).unwrap();

        // Deserialize back to a template; the AST is rebuilt from the content
        let deserialized: Template = serde_json::from_str(&serialized).unwrap();

        let options = FormatOptions::default();
        let original_output = template.format(&options).unwrap();
        let deserialized_output = deserialized.format(&options).unwrap();

        assert_eq!(original_output, deserialized_output);
        assert_eq!(original_output, "Hello, {{name}}!\n");
    }
}
