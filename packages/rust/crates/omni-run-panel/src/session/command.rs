/// SGR sequence used for the echoed command line.
const ECHO_COLOR: &str = r"\033[0;32m";
const ECHO_RESET: &str = r"\033[0m";

/// Build the shell line actually executed: a colorized echo of `command`
/// followed by `command` itself, so the panel shows what runs first.
#[must_use]
pub fn compose_command_line(command: &str) -> String {
    format!(
        "printf '{ECHO_COLOR}%s{ECHO_RESET}\\n' {}; {command}",
        single_quote(command)
    )
}

fn single_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_echoes_then_runs() {
        let line = compose_command_line("ls -la");
        assert_eq!(line, r"printf '\033[0;32m%s\033[0m\n' 'ls -la'; ls -la");
    }

    #[test]
    fn test_compose_quotes_single_quotes() {
        let line = compose_command_line("echo 'a b'");
        assert!(line.starts_with(r"printf '\033[0;32m%s\033[0m\n' 'echo '\''a b'\'''; "));
        assert!(line.ends_with("; echo 'a b'"));
    }
}
