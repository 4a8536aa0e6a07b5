use clap::Args;
use color_eyre::{eyre::eyre, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{BufRead, IsTerminal, Write};

use crate::config::{self, normalize_url, Config, ConfigFormat};
use crate::cospend::login::{open_browser, LoginFlow};

#[derive(Args, Debug)]
#[command(after_help = "Examples:
  cospend init
  cospend init --format yaml")]
pub struct InitArgs {
  /// Config file format
  #[arg(short, long, value_enum, default_value_t = ConfigFormat::Json)]
  pub format: ConfigFormat,
}

const AUTH_METHODS: [&str; 2] = [
  "Log in with browser (recommended)",
  "Enter username and password or app token",
];

pub async fn run(args: InitArgs) -> Result<()> {
  let stdin = std::io::stdin();
  let hidden = stdin.is_terminal();
  let mut prompter = Prompter::new(stdin.lock(), std::io::stdout(), hidden);

  let existing = config::existing_config_file();
  if let Some(path) = &existing {
    prompter.say(&format!("Config file already exists: {}", path.display()))?;
    if !prompter.confirm("Overwrite?")? {
      prompter.say("Aborted.")?;
      return Ok(());
    }
  }

  let domain = normalize_url(&prompter.ask_required("Nextcloud URL (e.g. https://cloud.example.com)")?);

  let config = match prompter.choose("How would you like to authenticate?", &AUTH_METHODS)? {
    0 => browser_login(&mut prompter, &domain).await?,
    _ => password_login(&mut prompter, domain)?,
  };

  let path = match existing {
    Some(path) => {
      config.save_to_path(&path)?;
      path
    }
    None => config.save(args.format)?,
  };

  prompter.say(&format!("Configuration saved to: {}", path.display()))?;
  Ok(())
}

async fn browser_login<R: BufRead, W: Write>(
  prompter: &mut Prompter<R, W>,
  domain: &str,
) -> Result<Config> {
  let flow = LoginFlow::new()?;
  let session = flow.start(domain).await?;

  prompter.say(&format!(
    "\nOpen this URL in your browser to log in:\n\n  {}\n",
    session.login
  ))?;
  if let Err(e) = open_browser(&session.login) {
    tracing::warn!(error = %e, "Failed to open browser");
  }
  prompter.say("Waiting for authentication...")?;

  let credentials = flow.wait_for_credentials(&session).await?;
  prompter.say(&format!("Logged in as {}", credentials.login_name))?;

  Ok(Config {
    domain: normalize_url(credentials.server_or(domain)),
    user: credentials.login_name,
    password: credentials.app_password,
  })
}

fn password_login<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>, domain: String) -> Result<Config> {
  let user = prompter.ask_required("Username")?;
  let password = prompter.ask_secret("Password or app token")?;
  if password.is_empty() {
    return Err(eyre!("password is required"));
  }

  Ok(Config {
    domain,
    user,
    password,
  })
}

/// Line-based prompts over any reader/writer pair.
struct Prompter<R, W> {
  input: R,
  output: W,
  /// Read secrets without echo from the terminal
  hidden: bool,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
  fn new(input: R, output: W, hidden: bool) -> Self {
    Self {
      input,
      output,
      hidden,
    }
  }

  fn say(&mut self, line: &str) -> Result<()> {
    writeln!(self.output, "{}", line)?;
    Ok(())
  }

  fn prompt(&mut self, label: &str) -> Result<()> {
    write!(self.output, "{}: ", label)?;
    self.output.flush()?;
    Ok(())
  }

  fn read_line(&mut self) -> Result<String> {
    let mut line = String::new();
    if self.input.read_line(&mut line)? == 0 {
      return Err(eyre!("unexpected end of input"));
    }
    Ok(line.trim().to_string())
  }

  fn ask(&mut self, label: &str) -> Result<String> {
    self.prompt(label)?;
    self.read_line()
  }

  fn ask_required(&mut self, label: &str) -> Result<String> {
    let answer = self.ask(label)?;
    if answer.is_empty() {
      return Err(eyre!("{} is required", label));
    }
    Ok(answer)
  }

  fn ask_secret(&mut self, label: &str) -> Result<String> {
    self.prompt(label)?;
    if !self.hidden {
      return self.read_line();
    }

    let secret = read_hidden()?;
    writeln!(self.output)?;
    Ok(secret)
  }

  /// Yes/no question defaulting to no.
  fn confirm(&mut self, question: &str) -> Result<bool> {
    let answer = self.ask(&format!("{} [y/N]", question))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
  }

  /// Numbered menu; an empty answer picks the first option.
  fn choose(&mut self, question: &str, options: &[&str]) -> Result<usize> {
    self.say(question)?;
    for (i, option) in options.iter().enumerate() {
      self.say(&format!("  {}) {}", i + 1, option))?;
    }

    loop {
      let answer = self.ask(&format!("Choice [1-{}, default 1]", options.len()))?;
      if answer.is_empty() {
        return Ok(0);
      }
      match answer.parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
        _ => self.say(&format!("Invalid choice: {}", answer))?,
      }
    }
  }
}

/// Restores cooked mode when dropped
struct RawMode;

impl RawMode {
  fn enable() -> Result<Self> {
    enable_raw_mode().map_err(|e| eyre!("Failed to enable raw mode: {}", e))?;
    Ok(Self)
  }
}

impl Drop for RawMode {
  fn drop(&mut self) {
    let _ = disable_raw_mode();
  }
}

/// Read one line from the terminal without echoing it.
fn read_hidden() -> Result<String> {
  let _raw = RawMode::enable()?;
  let mut secret = String::new();

  loop {
    let Event::Key(key) = event::read()? else {
      continue;
    };
    if key.kind != KeyEventKind::Press {
      continue;
    }

    match key.code {
      KeyCode::Enter => return Ok(secret),
      KeyCode::Backspace => {
        secret.pop();
      }
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        return Err(eyre!("Interrupted"));
      }
      KeyCode::Char(c) => secret.push(c),
      _ => {}
    }
  }
}
