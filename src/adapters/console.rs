//! Console Form - Interactive front end
//!
//! A line-oriented form: two credential fields, five order fields, and two
//! actions (`balance`, `order`). The desk is connected once both
//! credentials are non-empty. Results are printed verbatim as JSON and a
//! failed action prints `null`; details of the failure go to the log.

use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::config::OrderConfig;
use crate::domain::{BotError, Credentials, OrderKind, OrderRequest, Side};
use crate::ports::desk::{DeskConnector, OrderDesk};

const HELP: &str = "\
Commands:
  key <API_KEY>          set the API key
  secret <API_SECRET>    set the API secret
  symbol <SYMBOL>        e.g. BTCUSDT
  side <BUY|SELL>
  type <MARKET|LIMIT>
  quantity <QTY>
  price <PRICE|none>     only used for LIMIT orders
  balance                fetch the account balance
  order                  place an order with the current fields
  show                   print the form
  help                   print this help
  quit                   leave
";

const CREDENTIALS_PROMPT: &str =
  "Enter your API key and secret first: `key <API_KEY>` and `secret <API_SECRET>`.";

/// Order fields of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderForm {
  pub symbol: String,
  pub side: Side,
  pub kind: OrderKind,
  pub quantity: Decimal,
  pub price: Option<Decimal>,
}

impl OrderForm {
  /// Form pre-filled from the `[orders]` config section.
  pub fn from_config(config: &OrderConfig) -> Self {
    Self {
      symbol: config.default_symbol.clone(),
      side: Side::Buy,
      kind: OrderKind::Market,
      quantity: config.default_quantity,
      price: None,
    }
  }

  /// Build a request; the price is only forwarded for LIMIT orders.
  ///
  /// # Errors
  /// `BotError::Validation` for invalid symbol, quantity or price.
  pub fn to_request(&self) -> Result<OrderRequest, BotError> {
    let price = match self.kind {
      OrderKind::Market => None,
      OrderKind::Limit => self.price,
    };
    OrderRequest::new(&self.symbol, self.side, self.kind, self.quantity, price)
  }
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Key(String),
  Secret(String),
  Symbol(String),
  Side(Side),
  Kind(OrderKind),
  Quantity(Decimal),
  Price(Option<Decimal>),
  Balance,
  Order,
  Show,
  Help,
  Quit,
}

impl FromStr for Command {
  type Err = String;

  fn from_str(line: &str) -> Result<Self, Self::Err> {
    let line = line.trim();
    let (word, arg) = line
      .split_once(char::is_whitespace)
      .map_or((line, ""), |(w, a)| (w, a.trim()));

    let need_arg = |name: &str| {
      if arg.is_empty() {
        Err(format!("`{name}` needs a value"))
      } else {
        Ok(arg)
      }
    };
    let decimal = |name: &str| -> Result<Decimal, String> {
      let raw = need_arg(name)?;
      Decimal::from_str(raw).map_err(|e| format!("invalid {name} '{raw}': {e}"))
    };

    match word.to_ascii_lowercase().as_str() {
      "key" => Ok(Self::Key(arg.to_string())),
      "secret" => Ok(Self::Secret(arg.to_string())),
      "symbol" => need_arg("symbol").map(|s| Self::Symbol(s.to_ascii_uppercase())),
      "side" => need_arg("side")?
        .parse()
        .map(Self::Side)
        .map_err(|e: BotError| e.to_string()),
      "type" => need_arg("type")?
        .parse()
        .map(Self::Kind)
        .map_err(|e: BotError| e.to_string()),
      "quantity" | "qty" => decimal("quantity").map(Self::Quantity),
      "price" if arg.eq_ignore_ascii_case("none") => Ok(Self::Price(None)),
      "price" => decimal("price").map(|p| Self::Price(Some(p))),
      "balance" => Ok(Self::Balance),
      "order" => Ok(Self::Order),
      "show" => Ok(Self::Show),
      "help" | "?" => Ok(Self::Help),
      "quit" | "exit" => Ok(Self::Quit),
      other => Err(format!("unknown command '{other}', type `help`")),
    }
  }
}

/// Whether the session continues after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
  Continue,
  Quit,
}

/// Interactive session state.
pub struct Console<C: DeskConnector> {
  connector: C,
  api_key: String,
  api_secret: String,
  form: OrderForm,
  desk: Option<Box<dyn OrderDesk>>,
}

impl<C: DeskConnector> Console<C> {
  pub fn new(connector: C, defaults: &OrderConfig) -> Self {
    Self {
      connector,
      api_key: String::new(),
      api_secret: String::new(),
      form: OrderForm::from_config(defaults),
      desk: None,
    }
  }

  /// Pre-fill the credential fields (CLI flags or env).
  #[must_use]
  pub fn with_credentials(mut self, api_key: Option<String>, api_secret: Option<String>) -> Self {
    self.api_key = api_key.unwrap_or_default();
    self.api_secret = api_secret.unwrap_or_default();
    self
  }

  pub fn is_connected(&self) -> bool {
    self.desk.is_some()
  }

  /// Read commands until `quit` or end of input.
  pub async fn run<R, W>(&mut self, input: R, output: &mut W) -> Result<()>
  where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
  {
    write_out(output, "Futures testnet order desk. Type `help` for commands.\n").await?;
    if self.has_credentials() {
      self.try_connect(output).await?;
    } else {
      write_out(output, &format!("{CREDENTIALS_PROMPT}\n")).await?;
    }

    let mut lines = input.lines();
    loop {
      write_out(output, "> ").await?;
      let Some(line) = lines.next_line().await.context("Failed to read input")? else {
        break;
      };
      if self.handle_line(&line, output).await? == Flow::Quit {
        break;
      }
    }
    Ok(())
  }

  /// Apply one input line.
  pub async fn handle_line<W>(&mut self, line: &str, output: &mut W) -> Result<Flow>
  where
    W: AsyncWrite + Unpin,
  {
    if line.trim().is_empty() {
      return Ok(Flow::Continue);
    }

    let command = match line.parse::<Command>() {
      Ok(command) => command,
      Err(msg) => {
        write_out(output, &format!("{msg}\n")).await?;
        return Ok(Flow::Continue);
      }
    };

    match command {
      Command::Key(key) => {
        self.api_key = key;
        self.credentials_changed(output).await?;
      }
      Command::Secret(secret) => {
        self.api_secret = secret;
        self.credentials_changed(output).await?;
      }
      Command::Symbol(symbol) => self.form.symbol = symbol,
      Command::Side(side) => self.form.side = side,
      Command::Kind(kind) => self.form.kind = kind,
      Command::Quantity(quantity) => self.form.quantity = quantity,
      Command::Price(price) => self.form.price = price,
      Command::Balance => {
        if let Some(desk) = self.ready_desk(output).await? {
          let result = desk.get_balance().await;
          render(output, result.ok()).await?;
        }
      }
      Command::Order => {
        if !self.has_credentials() {
          write_out(output, &format!("{CREDENTIALS_PROMPT}\n")).await?;
          return Ok(Flow::Continue);
        }
        let request = match self.form.to_request() {
          Ok(request) => request,
          Err(e) => {
            write_out(output, &format!("{e}\n")).await?;
            return Ok(Flow::Continue);
          }
        };
        if let Some(desk) = self.ready_desk(output).await? {
          info!(symbol = %request.symbol, side = %request.side, kind = %request.kind, "Order requested from console");
          let result = desk.place_order(&request).await;
          render(output, result.ok()).await?;
        }
      }
      Command::Show => write_out(output, &self.describe()).await?,
      Command::Help => write_out(output, HELP).await?,
      Command::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
  }

  fn has_credentials(&self) -> bool {
    !self.api_key.trim().is_empty() && !self.api_secret.trim().is_empty()
  }

  async fn credentials_changed<W: AsyncWrite + Unpin>(&mut self, output: &mut W) -> Result<()> {
    self.desk = None;
    if self.has_credentials() {
      self.try_connect(output).await?;
    }
    Ok(())
  }

  /// Connect with the current credentials, reporting the outcome.
  async fn try_connect<W: AsyncWrite + Unpin>(&mut self, output: &mut W) -> Result<()> {
    let outcome = match Credentials::new(&self.api_key, &self.api_secret) {
      Ok(credentials) => self.connector.connect(credentials).await,
      Err(e) => Err(e),
    };
    match outcome {
      Ok(desk) => {
        self.desk = Some(desk);
        write_out(output, "Connected.\n").await
      }
      Err(e) => {
        warn!(error = %e, "Console could not connect");
        write_out(output, &format!("{e}\n")).await
      }
    }
  }

  /// The connected desk, connecting first if needed. Prints the
  /// credentials prompt and returns `None` when they are missing.
  async fn ready_desk<W: AsyncWrite + Unpin>(
    &mut self,
    output: &mut W,
  ) -> Result<Option<&dyn OrderDesk>> {
    if !self.has_credentials() {
      write_out(output, &format!("{CREDENTIALS_PROMPT}\n")).await?;
      return Ok(None);
    }
    if self.desk.is_none() {
      self.try_connect(output).await?;
    }
    Ok(self.desk.as_deref())
  }

  fn describe(&self) -> String {
    let mut s = String::new();
    let secret = if self.api_secret.is_empty() {
      "(not set)"
    } else {
      "********"
    };
    let key = if self.api_key.is_empty() {
      "(not set)"
    } else {
      self.api_key.as_str()
    };
    let _ = writeln!(s, "api key:    {key}");
    let _ = writeln!(s, "api secret: {secret}");
    let _ = writeln!(s, "symbol:     {}", self.form.symbol);
    let _ = writeln!(s, "side:       {}", self.form.side);
    let _ = writeln!(s, "type:       {}", self.form.kind);
    let _ = writeln!(s, "quantity:   {}", self.form.quantity);
    if self.form.kind == OrderKind::Limit {
      let price = self
        .form
        .price
        .map_or_else(|| "(not set)".to_string(), |p| p.to_string());
      let _ = writeln!(s, "price:      {price}");
    }
    let _ = writeln!(
      s,
      "connected:  {}",
      if self.is_connected() { "yes" } else { "no" }
    );
    s
  }
}

async fn write_out<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
  output
    .write_all(text.as_bytes())
    .await
    .context("Failed to write output")?;
  output.flush().await.context("Failed to flush output")
}

/// Print a result verbatim; an absent result prints `null`.
async fn render<W, T>(output: &mut W, value: Option<T>) -> Result<()>
where
  W: AsyncWrite + Unpin,
  T: Serialize,
{
  let mut json = serde_json::to_string_pretty(&value).context("Failed to render result")?;
  json.push('\n');
  write_out(output, &json).await
}
