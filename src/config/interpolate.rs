//! `${NAME}` substitution for configuration text.
//!
//! Secrets and endpoints live in the environment (usually a `.env` file), the
//! config file only references them. A reference to an unset variable is an
//! error rather than an empty string, so a typo never ends up as an RPC URL.

use eyre::ContextCompat;

pub fn interpolate_env(text: &str) -> eyre::Result<String> {
    interpolate(text, |name| std::env::var(name).ok())
}

/// Replaces every `${NAME}` in `text` with `lookup(NAME)`. `$$` yields a
/// literal `$`, any other `$` is copied through unchanged. Whole-line `#`
/// comments are copied verbatim.
///
/// Errors point at a line and the offending reference only, the text itself
/// may hold keys.
pub fn interpolate<F>(text: &str, lookup: F) -> eyre::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(text.len());

    for (idx, line) in text.split_inclusive('\n').enumerate() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
        } else {
            interpolate_line(line, idx + 1, &lookup, &mut result)?;
        }
    }

    Ok(result)
}

fn interpolate_line<F>(
    line: &str,
    line_number: usize,
    lookup: &F,
    result: &mut String,
) -> eyre::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let mut rest = line;

    while let Some(idx) = rest.find('$') {
        result.push_str(&rest[..idx]);
        rest = &rest[idx..];

        if let Some(after) = rest.strip_prefix("$$") {
            result.push('$');
            rest = after;
        } else if let Some(after) = rest.strip_prefix("${") {
            let end = after.find('}').with_context(|| {
                format!(
                    "Unterminated variable reference at line {line_number}: {:?}",
                    reference_fragment(after)
                )
            })?;

            let name = after[..end].trim();
            if name.is_empty() {
                eyre::bail!("Empty variable reference at line {line_number}");
            }

            let value = lookup(name).with_context(|| {
                format!("Environment variable {name} is not set")
            })?;

            result.push_str(&value);
            rest = &after[end + 1..];
        } else {
            result.push('$');
            rest = &rest[1..];
        }
    }

    result.push_str(rest);

    Ok(())
}

/// `${` followed by the identifier characters after it.
fn reference_fragment(after: &str) -> String {
    let name: String = after
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    format!("${{{name}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use indoc::indoc;
    use maplit::hashmap;

    use super::*;

    fn vars() -> HashMap<&'static str, &'static str> {
        hashmap! {
            "ALCHEMY_API_KEY" => "alchemy",
            "BSC_TESTNET_RPC" => "https://data-seed-prebsc-1-s1.binance.org:8545",
        }
    }

    fn lookup(name: &str) -> Option<String> {
        vars().get(name).map(|v| v.to_string())
    }

    #[test]
    fn replaces_references() {
        let out = interpolate(
            "https://eth-goerli.g.alchemy.com/v2/${ALCHEMY_API_KEY}",
            lookup,
        )
        .unwrap();

        assert_eq!(out, "https://eth-goerli.g.alchemy.com/v2/alchemy");
    }

    #[test]
    fn replaces_multiple_references_on_one_line() {
        let out =
            interpolate("${ALCHEMY_API_KEY}-${ ALCHEMY_API_KEY }", lookup)
                .unwrap();

        assert_eq!(out, "alchemy-alchemy");
    }

    #[test]
    fn text_without_references_is_unchanged() {
        let text = "solidity: 0.8.9\nprice: $5";

        assert_eq!(interpolate(text, lookup).unwrap(), text);
    }

    #[test]
    fn double_dollar_escapes() {
        assert_eq!(interpolate("$${X}", lookup).unwrap(), "${X}");
    }

    #[test]
    fn missing_variable_is_an_error() {
        let err = interpolate("${WORK_PRIVATE_KEY}", lookup).unwrap_err();

        assert!(err.to_string().contains("WORK_PRIVATE_KEY"));
    }

    #[test]
    fn unterminated_and_empty_references_are_errors() {
        assert!(interpolate("${BSC_TESTNET_RPC", lookup).is_err());
        assert!(interpolate("${}", lookup).is_err());
        assert!(interpolate("url: ${BSC_TESTNET_RPC\n}", lookup).is_err());
    }

    #[test]
    fn errors_do_not_echo_the_config() {
        let secret =
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let text = format!("accounts: [\"0x{secret}\"]\nurl: ${{RPC");

        let err = interpolate(&text, lookup).unwrap_err();
        let message = format!("{err:?}");

        assert!(message.contains("line 2"));
        assert!(message.contains("${RPC"));
        assert!(!message.contains(secret));
        assert!(!message.contains("accounts"));

        let err = interpolate(&format!("key: {secret} ${{}}"), lookup).unwrap_err();
        assert!(!format!("{err:?}").contains(secret));
    }

    #[test]
    fn commented_lines_are_left_alone() {
        let text = indoc! {"
            networks:
              # url: ${OLD_UNSET_RPC}
                # ${
              bsc_testnet: ${BSC_TESTNET_RPC}
        "};

        assert_eq!(
            interpolate(text, lookup).unwrap(),
            indoc! {"
                networks:
                  # url: ${OLD_UNSET_RPC}
                    # ${
                  bsc_testnet: https://data-seed-prebsc-1-s1.binance.org:8545
            "}
        );
    }
}
