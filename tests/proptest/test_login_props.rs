//! Property-based tests for the login command

#[path = "../test_utils/mod.rs"]
mod test_utils;

use azdterm::commands::LoginCommand;
use azdterm::task::TaskOptions;
use azdterm::ActionContext;
use proptest::prelude::*;
use std::sync::Arc;
use test_utils::{MockCliFactory, RecordingExecutor};

fn run_login(program: &str, command_id: &str, title: &str, should_prompt: bool) -> Vec<test_utils::ExecutedTask> {
    let cli = Arc::new(MockCliFactory::new(program));
    let tasks = RecordingExecutor::new();
    let login = LoginCommand::new(cli, tasks.clone(), title);

    tokio_test::block_on(login.run(&ActionContext::new(command_id), should_prompt)).unwrap();
    tasks.tasks()
}

proptest! {
    #[test]
    fn test_login_is_last_and_appended_once(
        program in "[a-zA-Z0-9_/.-]{1,40}",
        command_id in "\\PC{0,30}",
        should_prompt in any::<bool>(),
    ) {
        prop_assume!(program != "login");
        let executed = run_login(&program, &command_id, "Azure Dev CLI", should_prompt);

        prop_assert_eq!(executed.len(), 1);
        let command = &executed[0].command;
        prop_assert_eq!(command.len(), 2);
        prop_assert_eq!(&command[0], &program);
        prop_assert_eq!(command.last().map(String::as_str), Some("login"));
    }

    #[test]
    fn test_always_new_and_focused(
        title in "\\PC{1,40}",
        should_prompt in any::<bool>(),
    ) {
        let executed = run_login("azd", "azure-dev.commands.cli.login", &title, should_prompt);

        prop_assert_eq!(executed[0].options, TaskOptions { always_run_new: true, focus: true });
        prop_assert_eq!(&executed[0].title, &title);
    }
}
