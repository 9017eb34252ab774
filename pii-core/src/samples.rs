//! Textos de demonstração para a interface web.
//!
//! Todos os dados são fictícios; números de documentos seguem apenas o
//! formato, não são válidos.

/// Retorna pares (domínio, texto).
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Banking",
            "Dear Mr. Rahul Sharma, your account with Punjab National Bank has been linked to PAN ABCDE1234F. \
             Please visit branch IFSC PUNB0123400 in Lucknow, Uttar Pradesh, or call +91 9876543210 for assistance.",
        ),
        (
            "Healthcare",
            "Patient Priya Menon (Aadhaar 4321 8765 2109) was admitted to Apollo Hospitals in Chennai. \
             Discharge summary will be emailed to priya.menon@example.in. PIN Code 600006.",
        ),
        (
            "HR",
            "Offer letter for Smt Kavita Rao, Voter ID XYZ1234567, joining Infosys Technologies Ltd at the Bengaluru campus. \
             Salary will be credited to card 4111 1111 1111 1111 until the bank account is verified.",
        ),
        (
            "E-commerce",
            "Order #5531 ships to Dr. Anil Verma, Postal Code 110001, New Delhi. Track it at https://shop.example.in/track/5531 \
             or write to support@shop.example.in. GSTIN of the seller: 27ABCDE1234F1Z5.",
        ),
        (
            "Travel",
            "Passport J8369854 was issued to Vikram Singh at the Mumbai office; visa details are at www.visa.example.com.",
        ),
        (
            "Clean",
            "The quarterly meeting has been moved to next week. Please review the attached agenda and share your comments.",
        ),
    ]
}
