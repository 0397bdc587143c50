//! Bodies of the OTP verification email.
//!
//! The code is interpolated as-is. Callers that accept codes from untrusted
//! input must validate them first (see `utils::validate_otp`).

pub fn render_otp_html(otp: &str) -> String {
  format!(
    r##"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h2 style="color: #0891b2;">Welcome to Redigo! 🚗</h2>
  <p>Hello User,</p>
  <p>Thank you for using Redigo!</p>
  <div style="background-color: #f0f9ff; padding: 20px; border-radius: 8px; text-align: center; margin: 20px 0;">
    <h3 style="color: #0891b2; margin-top: 0;">Your OTP Code:</h3>
    <div style="font-size: 32px; font-weight: bold; color: #0f172a; letter-spacing: 5px; font-family: monospace;">
      {otp}
    </div>
  </div>
  <p>Please enter this code to verify your email address. This OTP is valid for <strong>5 minutes</strong>.</p>
  <p style="color: #6b7280; font-size: 14px;">
    If you did not request this code, please ignore this email.
  </p>
  <hr style="border: none; border-top: 1px solid #e5e7eb; margin: 20px 0;">
  <p style="color: #6b7280; font-size: 14px;">
    Best regards,<br>
    The Redigo Team<br>
    🚗 Share your ride, share the journey!
  </p>
</div>
"##
  )
}

pub fn render_otp_text(otp: &str) -> String {
  format!(
    "Hello User,\n\nThank you for using Redigo!\n\nYour One-Time Password (OTP) is: {otp}\n\nPlease enter this code to verify your email address. This OTP is valid for 5 minutes.\n\nIf you did not request this code, please ignore this email.\n\nBest regards,\nThe Redigo Team\n🚗 Share your ride, share the journey!\n"
  )
}
