//! Login, logout and whoami.
//!
//! `login` runs the code flow interactively: after the code is sent the
//! prompt accepts the code, `resend` once the countdown is over, or `back` to
//! enter a different email.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use vitrine_storefront::auth::{CodeDelivery, LoginFlow, LoginStep};

use super::{CliError, Context};

/// Log in as `email`, prompting for the code on stdin.
pub async fn login(ctx: &Context, email: &str) -> Result<(), CliError> {
    let mut flow = LoginFlow::new(
        ctx.catalog.clone(),
        ctx.challenge.clone(),
        Arc::clone(ctx.shop.session()),
    );
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let delivery = flow.submit_email(email).await?;
    announce(email, &delivery);

    while !flow.is_closed() {
        match flow.step().clone() {
            LoginStep::AwaitingEmail => {
                let email = prompt(&mut input, "Email: ").await?;
                match flow.submit_email(&email).await {
                    Ok(delivery) => announce(&email, &delivery),
                    Err(e) if !e.is_transport() => println!("{e}"),
                    Err(e) => return Err(e.into()),
                }
            }
            LoginStep::AwaitingCode { .. } => {
                let line = prompt(&mut input, "Code (or resend/back): ").await?;
                match line.as_str() {
                    "back" => {
                        flow.back();
                    }
                    "resend" => match flow.resend().await {
                        Ok(delivery) => announce("your email", &delivery),
                        Err(e) if !e.is_transport() => println!("{e}"),
                        Err(e) => return Err(e.into()),
                    },
                    code => match flow.submit_code(code).await {
                        Ok(user) => println!("Logged in as {}", user.display_name()),
                        Err(e) if !e.is_transport() => println!("{e}"),
                        Err(e) => return Err(e.into()),
                    },
                }
            }
            LoginStep::Authenticated { .. } => break,
        }
    }
    Ok(())
}

/// End the session.
pub fn logout(ctx: &Context) -> Result<(), CliError> {
    match ctx.shop.session().current() {
        Some(user) => {
            ctx.shop.session().logout()?;
            println!("Logged out {}", user.email);
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

/// Print the session user.
pub fn whoami(ctx: &Context) {
    match ctx.shop.session().current() {
        Some(user) => println!("{} <{}> (id {})", user.display_name(), user.email, user.id),
        None => println!("Not logged in"),
    }
}

fn announce(to: &str, delivery: &CodeDelivery) {
    println!("Code sent to {to}");
    if let Some(code) = &delivery.echoed_code {
        println!("(development) your code is {code}");
    }
}

async fn prompt(input: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<String, CliError> {
    print!("{label}");
    std::io::stdout().flush()?;
    input
        .next_line()
        .await?
        .map(|line| line.trim().to_string())
        .ok_or(CliError::Aborted)
}
