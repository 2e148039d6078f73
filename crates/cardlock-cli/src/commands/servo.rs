//! `cardlock servo`: interactive lock console.

use cardlock_hardware::PwmChannel;
use cardlock_servo::{ServoCommand, ServoLock};

use crate::args::HardwareArgs;
use crate::console::ConsoleInput;
use crate::peripherals::Bench;

/// Drive the lock by hand until `quit` or end of input.
pub async fn execute(hardware: &HardwareArgs) -> anyhow::Result<()> {
    let bench = Bench::new(hardware.to_config()?);
    let mut lock = bench.open_lock().await?;
    let mut input = ConsoleInput::stdin();

    let result = console(&mut lock, &mut input).await;
    lock.cleanup()?;
    result
}

async fn console<P: PwmChannel>(
    lock: &mut ServoLock<P>,
    input: &mut ConsoleInput,
) -> anyhow::Result<()> {
    while let Some(line) = input
        .prompt("Enter command (lock/unlock/toggle/quit): ")
        .await
    {
        let command = match line.parse::<ServoCommand>() {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match command {
            ServoCommand::Lock => lock.lock().await?,
            ServoCommand::Unlock => lock.unlock().await?,
            ServoCommand::Toggle => {
                lock.toggle().await?;
            }
            ServoCommand::Quit => break,
        }
        println!("Lock is {}", lock.state());
    }
    Ok(())
}
