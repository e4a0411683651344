use axum::extract::FromRef;
use log::{info, warn};

use crate::{
    addresses::{models::Address, DynAddressService},
    api::{query::Owner, Upload},
    auth::DynAuthService,
    clock::DynClock,
    enrichment::NameResolver,
    files::{check_upload, DynFileService},
    models::{present, SettlementStatus},
    payments::{
        models::{CheckoutRequest, PaymentUpdate},
        DynPaymentService,
    },
    products::DynProductService,
    state::AppState,
    support::{
        models::{SupportKind, SupportRequest},
        DynSupportMailer,
    },
    users::{models::User, DynUserService},
    validations::{FieldErrors, Rejection},
    views::models::MediaKind,
};

use super::{
    actions::{is_allowed, Action, Role},
    error::{Error, Result},
    fees::{platform_fee, settlement, subtotal},
    models::*,
    step::{Progress, Step},
    DynTransactionService,
};

pub type Outcome<T = ()> = std::result::Result<T, Rejection>;

/// Everything a transaction page reads from or acts through
#[derive(Clone)]
pub struct Lifecycle {
    pub tx_svc: DynTransactionService,
    pub product_svc: DynProductService,
    pub payment_svc: DynPaymentService,
    pub address_svc: DynAddressService,
    pub file_svc: DynFileService,
    pub user_svc: DynUserService,
    pub auth_svc: DynAuthService,
    pub mailer: DynSupportMailer,
    pub names: NameResolver,
    pub clock: DynClock,
}

impl FromRef<AppState> for Lifecycle {
    fn from_ref(state: &AppState) -> Self {
        Self {
            tx_svc: state.tx_svc.clone(),
            product_svc: state.product_svc.clone(),
            payment_svc: state.payment_svc.clone(),
            address_svc: state.address_svc.clone(),
            file_svc: state.file_svc.clone(),
            user_svc: state.user_svc.clone(),
            auth_svc: state.auth_svc.clone(),
            mailer: state.mailer.clone(),
            names: state.names.clone(),
            clock: state.clock.clone(),
        }
    }
}

fn ensure(role: Role, tx: &Transaction, action: Action) -> Outcome {
    let progress = Progress::of(tx);
    if is_allowed(role, progress, action) {
        return Ok(());
    }
    warn!(
        "Refused {} by the {} of transaction {} at {}",
        action.label(),
        role,
        tx.transaction_id,
        progress.label()
    );
    Err(Rejection::Failed(format!("{} is not available at this step of the transaction", action.label())))
}

///
/// Address an accepted offer ships to unless the buyer picks another:
/// the buyer's main address while it is active, otherwise the first
/// active one.
///
pub fn default_address(addresses: &[Address], main_address_id: &Option<String>) -> Option<String> {
    let mut active = addresses.iter().filter(|a| a.is_active());
    match present(main_address_id) {
        Some(main) if addresses.iter().any(|a| a.is_active() && a.address_id == main) => Some(main.to_string()),
        _ => active.next().map(|a| a.address_id.clone()),
    }
}

impl Lifecycle {
    /// Loads a transaction from `role`'s side, refusing members who are not that party
    pub async fn load(&self, token: &str, transaction_id: &str, role: Role) -> Result<(Transaction, User)> {
        let owner = match role {
            Role::Seller => Owner::current_user(),
            Role::Buyer => Owner::current_customer(),
        };
        let (tx, me) = futures::join!(
            self.tx_svc.get_transaction(token, transaction_id, Some(owner)),
            self.auth_svc.current_user(token),
        );
        let (tx, me) = (tx?, me?);

        let is_party = match role {
            Role::Seller => tx.is_seller(&me.user_id),
            Role::Buyer => tx.is_buyer(&me.user_id),
        };
        if !is_party {
            return Err(Error::NotAParty(role.label(), transaction_id.to_string()));
        }
        Ok((tx, me))
    }

    ///
    /// Makes an offer on one of the member's products. The fee sent
    /// along is the platform fee of the offer's subtotal.
    ///
    pub async fn create_offer(&self, token: &str, me: &User, form: &TransactionForm) -> Outcome {
        let mut payload = form.validate_offer(&[&me.user_id, me.username()])?;

        let product = match self.product_svc.get_product(token, &payload.product_id).await {
            Ok(product) if present(&product.user_id).map_or(true, |owner| owner == me.user_id) => product,
            Ok(_) => return Err(FieldErrors::single("product_id", "Product not found").into()),
            Err(err) => {
                return Err(match err.reject("Product not found") {
                    Rejection::Unauthorized => Rejection::Unauthorized,
                    _ => FieldErrors::single("product_id", "Product not found").into(),
                })
            }
        };
        payload.fee = subtotal(product.price(), payload.product_number, payload.shipping_price)
            .and_then(platform_fee)
            .ok_or_else(|| FieldErrors::single("product_number", "Offer total is too large"))?;

        self.tx_svc
            .create_transaction(token, payload)
            .await
            .map_err(|err| err.reject("Failed to create transaction. Please try again."))?;
        info!("{} offered product {}", me.username(), product.product_id);
        Ok(())
    }

    ///
    /// Carries out an action posted from a transaction page. Returns
    /// where the browser goes next when that is not the transaction
    /// itself.
    ///
    pub async fn perform(
        &self,
        token: &str,
        tx: &Transaction,
        role: Role,
        action: Action,
        form: &StepForm,
    ) -> Outcome<Option<String>> {
        ensure(role, tx, action)?;
        match action {
            Action::Accept => self.accept(token, tx, form).await?,
            Action::Reject => self.reject_offer(token, tx).await?,
            Action::Pay => return self.pay(token, tx).await.map(Some),
            Action::Ship => self.ship(token, tx, form, None).await?,
            Action::ConfirmDelivery => self.confirm_delivery(token, tx, role).await?,
            Action::DeliverDigital => self.deliver_digital(token, tx, form).await?,
            Action::Complete => self.complete(token, tx).await?,
            Action::Dispute => self.dispute(token, tx, form).await?,
            Action::RequestCancellation => {
                self.mail(token, tx, role, SupportKind::Cancellation, &form.message).await?
            }
            Action::Help => self.mail(token, tx, role, SupportKind::Help, &form.message).await?,
        }
        Ok(None)
    }

    async fn update(&self, token: &str, tx: &Transaction, req: TransactionUpdate, fallback: &str) -> Outcome {
        self.tx_svc
            .update_transaction(token, &tx.transaction_id, req)
            .await
            .map_err(|err| err.reject(fallback))
    }

    /// Physical offers need the address the goods ship to
    pub async fn accept(&self, token: &str, tx: &Transaction, form: &StepForm) -> Outcome {
        ensure(Role::Buyer, tx, Action::Accept)?;
        let address_id = match (tx.is_digital(), form.address_id.trim()) {
            (true, _) => None,
            (false, "") => return Err(FieldErrors::single("address_id", "Please select a shipping address").into()),
            (false, id) => Some(id.to_string()),
        };

        let req = TransactionUpdate { status: Some(TransactionStatus::Accepted), address_id, ..Default::default() };
        self.update(token, tx, req, "Failed to accept transaction. Please try again.").await?;
        info!("Transaction {} accepted", tx.transaction_id);
        Ok(())
    }

    pub async fn reject_offer(&self, token: &str, tx: &Transaction) -> Outcome {
        ensure(Role::Buyer, tx, Action::Reject)?;
        let req = TransactionUpdate::status(TransactionStatus::Rejected, tx);
        self.update(token, tx, req, "Failed to reject transaction. Please try again.").await?;
        info!("Transaction {} rejected", tx.transaction_id);
        Ok(())
    }

    /// Opens a checkout for the buyer's side of the settlement and returns its URL
    pub async fn pay(&self, token: &str, tx: &Transaction) -> Outcome<String> {
        ensure(Role::Buyer, tx, Action::Pay)?;
        let product_id = present(&tx.product_id).unwrap_or_default();
        let product = self
            .product_svc
            .get_product(token, product_id)
            .await
            .map_err(|err| err.reject("Failed to load the product. Please try again."))?;

        let amount = settlement(tx, product.price())
            .ok_or_else(|| Rejection::Failed("Transaction total is too large to pay.".into()))?
            .buyer;
        let checkout = self
            .payment_svc
            .start_checkout(token, &tx.transaction_id, CheckoutRequest::for_transaction(&tx.transaction_id, amount))
            .await
            .map_err(|err| err.reject("Failed to start payment. Please try again."))?;
        info!("Checkout of {} started for transaction {}", amount, tx.transaction_id);
        Ok(checkout.checkout_url)
    }

    ///
    /// Settles the payment the checkout page came back with and returns
    /// the notice to show. A payment that is no longer pending keeps its
    /// status; a completed payment is attached while the transaction
    /// still waits for one.
    ///
    pub async fn payment_return(&self, token: &str, tx: &Transaction, ret: &PaymentReturn) -> Outcome<Option<&'static str>> {
        let Some(payment_id) = ret.payment.as_deref().map(str::trim).filter(|id| !id.is_empty()) else {
            return Ok(None);
        };
        let (requested, notice) = match ret.payment_status.as_deref().map(str::trim) {
            Some("success") => (SettlementStatus::Completed, "Payment completed"),
            Some("cancel") => (SettlementStatus::Canceled, "Payment was canceled"),
            _ => return Ok(None),
        };

        let payment = self
            .payment_svc
            .get_payment(token, payment_id)
            .await
            .map_err(|err| err.reject("Failed to verify payment. Please try again."))?;
        let settled = if payment.is_pending() {
            let req = PaymentUpdate { status: Some(requested), ..Default::default() };
            self.payment_svc
                .update_payment(token, payment_id, req)
                .await
                .map_err(|err| err.reject("Failed to update payment. Please try again."))?;
            requested
        } else {
            payment.status.unwrap_or(SettlementStatus::Pending)
        };

        if settled == SettlementStatus::Completed && Progress::of(tx) == Progress::Step(Step::AwaitingPayment) {
            let req = TransactionUpdate {
                payment_id: Some(payment_id.to_string()),
                delivered_at: tx.delivered_at,
                ..Default::default()
            };
            self.update(token, tx, req, "Failed to attach payment. Please try again.").await?;
            info!("Payment {} attached to transaction {}", payment_id, tx.transaction_id);
        }
        Ok(Some(notice))
    }

    /// Records the tracking number together with a photo of the parcel
    pub async fn ship(&self, token: &str, tx: &Transaction, form: &StepForm, image: Option<Upload>) -> Outcome {
        ensure(Role::Seller, tx, Action::Ship)?;

        let mut errors = FieldErrors::new();
        let shipping_number = form.shipping_number.trim();
        if shipping_number.is_empty() {
            errors.insert("shipping_number", "Shipping number is required");
        }
        match &image {
            None => errors.insert(SHIPPING_IMAGE_FIELD, "Shipping image is required"),
            Some(upload) => {
                if let Err(message) = check_upload(upload, MediaKind::Image) {
                    errors.insert(SHIPPING_IMAGE_FIELD, message);
                }
            }
        }
        let Some(image) = image.filter(|_| errors.is_empty()) else {
            return Err(errors.into());
        };

        let file = self
            .file_svc
            .upload(token, image)
            .await
            .map_err(|err| err.reject("Failed to upload image"))?;
        let req = TransactionUpdate {
            shipping_number: Some(shipping_number.to_string()),
            shipping_image_id: Some(file.file_id),
            ..Default::default()
        };
        self.update(token, tx, req, "Failed to save shipping details. Please try again.").await?;
        info!("Transaction {} shipped", tx.transaction_id);
        Ok(())
    }

    pub async fn confirm_delivery(&self, token: &str, tx: &Transaction, role: Role) -> Outcome {
        ensure(role, tx, Action::ConfirmDelivery)?;
        let req = TransactionUpdate { delivered_at: Some(self.clock.utc_now()), ..Default::default() };
        self.update(token, tx, req, "Failed to confirm delivery. Please try again.").await?;
        info!("Delivery of transaction {} confirmed by the {}", tx.transaction_id, role);
        Ok(())
    }

    pub async fn deliver_digital(&self, token: &str, tx: &Transaction, form: &StepForm) -> Outcome {
        ensure(Role::Seller, tx, Action::DeliverDigital)?;
        let details = form.delivered_details.trim();
        if details.is_empty() {
            return Err(FieldErrors::single("delivered_details", "Delivery details is required").into());
        }

        let req = TransactionUpdate {
            delivered_at: Some(self.clock.utc_now()),
            delivered_details: Some(details.to_string()),
            ..Default::default()
        };
        self.update(token, tx, req, "Failed to deliver. Please try again.").await?;
        info!("Transaction {} delivered", tx.transaction_id);
        Ok(())
    }

    pub async fn complete(&self, token: &str, tx: &Transaction) -> Outcome {
        ensure(Role::Buyer, tx, Action::Complete)?;
        let req = TransactionUpdate::status(TransactionStatus::Completed, tx);
        self.update(token, tx, req, "Failed to complete transaction. Please try again.").await?;
        info!("Transaction {} completed", tx.transaction_id);
        Ok(())
    }

    /// Support hears about the dispute before the transaction is marked disputed
    pub async fn dispute(&self, token: &str, tx: &Transaction, form: &StepForm) -> Outcome {
        ensure(Role::Buyer, tx, Action::Dispute)?;
        self.mail(token, tx, Role::Buyer, SupportKind::Dispute, &form.message).await?;

        let req = TransactionUpdate::status(TransactionStatus::Disputed, tx);
        self.update(token, tx, req, "Failed to dispute transaction. Please try again.").await
    }

    async fn mail(&self, token: &str, tx: &Transaction, role: Role, kind: SupportKind, message: &str) -> Outcome {
        let message = message.trim();
        if message.is_empty() {
            return Err(FieldErrors::single("message", kind.blank_message()).into());
        }

        let (buyer, seller) = futures::join!(self.party(token, &tx.customer_id), self.party(token, &tx.user_id));
        let req = SupportRequest {
            kind,
            transaction_id: tx.transaction_id.clone(),
            buyer_name: buyer.display_name(),
            buyer_email: buyer.email.unwrap_or_default(),
            seller_name: seller.display_name(),
            seller_email: seller.email.unwrap_or_default(),
            requested_by: role,
            message: message.to_string(),
        };
        self.mailer
            .send(req)
            .await
            .map_err(|err| err.reject("Failed to send your request. Please try again."))
    }

    /// A party of the transaction as far as it can be looked up
    async fn party(&self, token: &str, user_id: &Option<String>) -> User {
        let Some(user_id) = present(user_id) else {
            return User::default();
        };
        match self.user_svc.user_summary(token, user_id).await {
            Ok(user) => user,
            Err(err) => {
                warn!("Could not resolve user {}: {}", user_id, err);
                User { user_id: user_id.to_string(), ..Default::default() }
            }
        }
    }
}
