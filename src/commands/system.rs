use super::Flow;

pub fn handle_command(input: &str) -> Result<Flow, String> {
    match input.to_lowercase().as_str() {
        "help" => {
            print_help();
            Ok(Flow::Continue)
        }
        "exit" | "quit" => {
            println!("👋 Goodbye!");
            Ok(Flow::Exit)
        }
        _ => Err("Unknown system command. Type 'help' for available commands.".to_string()),
    }
}

pub fn print_help() {
    println!("\n📘 DocuMind Commands:");
    println!("  Just type your question about the uploaded document");
    println!("  Examples:");
    println!("    - what is the main finding of this paper?");
    println!("    - which datasets were used?");
    println!();

    println!("📄 Document Commands:");
    println!("  upload <file.pdf>  - Store, parse and index a PDF");
    println!("  status             - Show indexed documents and chunks");
    println!();

    println!("⚙️ System Commands:");
    println!("  help  - Show this help menu");
    println!("  exit  - Exit the program");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_and_quit_stop_the_loop() {
        assert_eq!(handle_command("exit").unwrap(), Flow::Exit);
        assert_eq!(handle_command("QUIT").unwrap(), Flow::Exit);
        assert_eq!(handle_command("help").unwrap(), Flow::Continue);
        assert!(handle_command("reboot").is_err());
    }
}
